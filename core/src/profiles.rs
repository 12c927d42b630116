//! Person profiles tracked inside a workspace.

use crate::{
    error::{OracleError, OracleResult},
    store::{OracleStore, PersonSummary},
    tenancy::TenantContext,
    types::EntityId,
};

pub struct PersonService<'a> {
    store: &'a OracleStore,
}

impl<'a> PersonService<'a> {
    pub fn new(store: &'a OracleStore) -> Self {
        Self { store }
    }

    /// Create a profile owned by the caller. A creator cannot hold two
    /// active profiles with the same name.
    pub fn create_person(
        &self,
        ctx: &TenantContext,
        name: &str,
        notes: Option<&str>,
        tags: &[String],
    ) -> OracleResult<EntityId> {
        let (identity, workspace_id, _) = ctx.require_workspace()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(OracleError::invalid_input("name is required"));
        }
        if self.store.active_person_name_taken(&identity.id, name)? {
            return Err(OracleError::invalid_input(format!(
                "you already have a profile named '{name}'"
            )));
        }
        let tags: Vec<String> = tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        let person_id = self
            .store
            .insert_person(workspace_id, &identity.id, name, notes, &tags)?;
        log::info!("person {person_id} created by user={} in workspace={workspace_id}", identity.id);
        Ok(person_id)
    }

    /// The caller's own active profiles, newest first, with reading counts.
    pub fn list_own_persons(&self, ctx: &TenantContext) -> OracleResult<Vec<PersonSummary>> {
        let (identity, workspace_id, _) = ctx.require_workspace()?;
        self.store.persons_created_by(workspace_id, &identity.id)
    }

    /// Archive a profile. Allowed for its creator and for owner/staff.
    pub fn archive_person(&self, ctx: &TenantContext, person_id: &str) -> OracleResult<()> {
        let (identity, workspace_id, role) = ctx.require_workspace()?;
        let person = self
            .store
            .active_person(workspace_id, person_id)?
            .ok_or_else(|| OracleError::not_found("person", person_id))?;
        if !role.is_elevated() && person.created_by_user_id != identity.id {
            return Err(OracleError::forbidden("not allowed to archive this person"));
        }
        self.store.archive_person(person_id)?;
        Ok(())
    }
}
