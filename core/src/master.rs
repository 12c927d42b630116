//! Master administrative area: the email allow-list.
//!
//! Only reachable with a context resolved under the master route scope.
//! Everything here goes through the admin handle.

use crate::{
    admin::AdminStore,
    config::{normalize_email, OracleConfig},
    error::{OracleError, OracleResult},
    store::AllowedEmailRow,
    tenancy::{TenancyState, TenantContext},
    types::EntityId,
};

pub struct MasterArea<'a> {
    admin: &'a AdminStore,
    config: &'a OracleConfig,
}

impl<'a> MasterArea<'a> {
    pub fn new(admin: &'a AdminStore, config: &'a OracleConfig) -> Self {
        Self { admin, config }
    }

    fn require_master(&self, ctx: &TenantContext) -> OracleResult<()> {
        let identity = ctx.require_identity()?;
        if ctx.state == TenancyState::Master && self.config.is_master_email(&identity.email) {
            Ok(())
        } else {
            Err(OracleError::forbidden("master area is restricted"))
        }
    }

    pub fn list(&self, ctx: &TenantContext) -> OracleResult<Vec<AllowedEmailRow>> {
        self.require_master(ctx)?;
        self.admin.allowed_emails()
    }

    pub fn add(&self, ctx: &TenantContext, email: &str) -> OracleResult<EntityId> {
        self.require_master(ctx)?;
        self.admin.add_allowed_email(email)
    }

    pub fn enable(&self, ctx: &TenantContext, allowed_email_id: &str) -> OracleResult<()> {
        self.require_master(ctx)?;
        self.admin.set_allowed_email_enabled(allowed_email_id, true)
    }

    pub fn disable(&self, ctx: &TenantContext, allowed_email_id: &str) -> OracleResult<()> {
        self.require_master(ctx)?;
        self.guard_master_entry(allowed_email_id, "disable")?;
        self.admin.set_allowed_email_enabled(allowed_email_id, false)
    }

    pub fn delete(&self, ctx: &TenantContext, allowed_email_id: &str) -> OracleResult<()> {
        self.require_master(ctx)?;
        self.guard_master_entry(allowed_email_id, "delete")?;
        self.admin.delete_allowed_email(allowed_email_id)
    }

    /// The master email can never lock itself out.
    fn guard_master_entry(&self, allowed_email_id: &str, action: &str) -> OracleResult<()> {
        let entry = self
            .admin
            .allowed_email(allowed_email_id)?
            .ok_or_else(|| OracleError::not_found("allowed email", allowed_email_id))?;
        if self.config.is_master_email(&normalize_email(&entry.email)) {
            return Err(OracleError::invalid_input(format!(
                "cannot {action} the master email"
            )));
        }
        Ok(())
    }
}
