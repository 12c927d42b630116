//! Application facade: one store, one admin handle, one config.
//!
//! Every command goes through the same two steps:
//!   1. Tenancy resolution under the command's route scope.
//!   2. The matching service call, with the resolved context.
//!
//! RULES:
//!   - With `enforce_allowed_emails`, identities are filtered through the
//!     allow-list before tenancy resolution sees them.
//!   - The tenant context is rebuilt for every command and never cached.
//!   - Failures come back as an error payload, never as a panic.

use crate::{
    admin::AdminStore,
    command::ClientCommand,
    config::OracleConfig,
    error::{OracleError, OracleResult},
    identity::{AllowListedIdentity, IdentityProvider},
    join::redeem_access_code,
    master::MasterArea,
    pointer::WorkspacePointer,
    profiles::PersonService,
    reading::ReadingService,
    store::OracleStore,
    tenancy::{RouteScope, TenancyResolver, TenantContext},
};
use serde_json::{json, Value};

pub struct OracleApp {
    store: OracleStore,
    admin: AdminStore,
    config: OracleConfig,
}

impl OracleApp {
    /// Wire the app around an already migrated store. The admin handle gets
    /// its own connection to the same database.
    pub fn build(store: OracleStore, config: OracleConfig) -> OracleResult<Self> {
        let admin = AdminStore::attach(&store)?;
        Ok(Self {
            store,
            admin,
            config,
        })
    }

    /// In-memory database with migrations applied (used in tests).
    pub fn build_test(config: OracleConfig) -> OracleResult<Self> {
        let store = OracleStore::in_memory()?;
        store.migrate()?;
        Self::build(store, config)
    }

    pub fn store(&self) -> &OracleStore {
        &self.store
    }

    pub fn admin(&self) -> &AdminStore {
        &self.admin
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn resolve(
        &self,
        identity: &dyn IdentityProvider,
        pointer: &mut dyn WorkspacePointer,
        scope: RouteScope,
    ) -> OracleResult<TenantContext> {
        let resolver = TenancyResolver::new(&self.store, &self.config);
        if self.config.enforce_allowed_emails {
            let gated = AllowListedIdentity::new(identity, &self.admin, &self.config);
            resolver.resolve(&gated, pointer, scope)
        } else {
            resolver.resolve(identity, pointer, scope)
        }
    }

    pub fn readings(&self) -> ReadingService<'_> {
        ReadingService::new(&self.store, &self.admin)
    }

    pub fn persons(&self) -> PersonService<'_> {
        PersonService::new(&self.store)
    }

    pub fn master(&self) -> MasterArea<'_> {
        MasterArea::new(&self.admin, &self.config)
    }

    /// Run one command and render its reply. Errors become
    /// `{"message", "status"}`.
    pub fn handle(
        &self,
        identity: &dyn IdentityProvider,
        pointer: &mut dyn WorkspacePointer,
        command: &ClientCommand,
    ) -> Value {
        match self.dispatch(identity, pointer, command) {
            Ok(reply) => reply,
            Err(e) => {
                if e.status() >= 500 {
                    log::error!("command failed: {e}");
                } else {
                    log::debug!("command rejected ({}): {e}", e.status());
                }
                json!(e.payload())
            }
        }
    }

    pub fn dispatch(
        &self,
        identity: &dyn IdentityProvider,
        pointer: &mut dyn WorkspacePointer,
        command: &ClientCommand,
    ) -> OracleResult<Value> {
        let ctx = self.resolve(identity, pointer, command.scope())?;
        let reply = match command {
            ClientCommand::CreateReading(request) => {
                let reading_id = self.readings().create_reading(&ctx, request)?;
                json!({ "readingId": reading_id })
            }
            ClientCommand::GetReading { reading_id } => {
                json!(self.readings().get_reading(&ctx, reading_id)?)
            }
            ClientCommand::History { before, limit } => {
                let limit = limit.unwrap_or(self.config.history_page_size);
                json!(self.readings().history(&ctx, before.as_deref(), limit)?)
            }
            ClientCommand::CreatePerson { name, notes, tags } => {
                let person_id = self
                    .persons()
                    .create_person(&ctx, name, notes.as_deref(), tags)?;
                json!({ "personId": person_id })
            }
            ClientCommand::ListPersons => json!(self.persons().list_own_persons(&ctx)?),
            ClientCommand::ArchivePerson { person_id } => {
                self.persons().archive_person(&ctx, person_id)?;
                json!({ "ok": true })
            }
            ClientCommand::RedeemAccessCode { code } => {
                let (workspace_id, role) = redeem_access_code(&self.store, &ctx, code)?;
                pointer.set(&workspace_id);
                json!({ "workspaceId": workspace_id, "role": role })
            }
            ClientCommand::ListAllowedEmails => json!(self.master().list(&ctx)?),
            ClientCommand::AddAllowedEmail { email } => {
                let allowed_email_id = self.master().add(&ctx, email)?;
                json!({ "allowedEmailId": allowed_email_id })
            }
            ClientCommand::SetAllowedEmailEnabled {
                allowed_email_id,
                enabled,
            } => {
                if *enabled {
                    self.master().enable(&ctx, allowed_email_id)?;
                } else {
                    self.master().disable(&ctx, allowed_email_id)?;
                }
                json!({ "ok": true })
            }
            ClientCommand::DeleteAllowedEmail { allowed_email_id } => {
                self.master().delete(&ctx, allowed_email_id)?;
                json!({ "ok": true })
            }
            ClientCommand::Quit => {
                return Err(OracleError::invalid_input("quit is handled by the runner"))
            }
        };
        Ok(reply)
    }
}
