//! Tenancy resolution. Runs once per request, before any route logic.
//!
//! RESOLUTION ORDER (fixed):
//!   1. Identity      : ask the identity collaborator; errors mean anonymous.
//!   2. Memberships   : load every workspace the identity belongs to.
//!   3. Provisioning  : apply the configured policy to fill gaps.
//!   4. Active choice : pointer match, else first membership.
//!   5. Pointer heal  : rewrite the pointer when it disagrees with step 4.
//!
//! RULES:
//!   - The pointer is a cache of step 4, never an input to authorization.
//!   - Provisioning writes are idempotent; retrying a request re-runs the
//!     whole check instead of trusting earlier partial state.
//!   - Any store failure during provisioning fails the request.
//!   - The master scope skips steps 2-5 and checks the master identity.

use crate::{
    config::{OracleConfig, ProvisioningPolicy},
    error::{OracleError, OracleResult},
    identity::{current_identity, IdentityProvider},
    pointer::WorkspacePointer,
    store::{MembershipRow, OracleStore},
    types::{Identity, Role, Workspace, WorkspaceId},
};

/// What a route needs from tenancy resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteScope {
    /// Anonymous callers allowed; an identity is still resolved if present.
    Anonymous,
    /// The join flow: identity required, a workspace is not.
    Join,
    /// Regular application routes: identity and workspace required.
    Tenant,
    /// Administrative area: master identity required, no workspace scoping.
    Master,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenancyState {
    Anonymous,
    Unprovisioned,
    Resolved,
    Master,
}

/// Per-request tenancy outcome. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub state: TenancyState,
    pub identity: Option<Identity>,
    pub workspace_id: Option<WorkspaceId>,
    pub role: Option<Role>,
    pub workspace: Option<Workspace>,
    pub is_master: bool,
}

impl TenantContext {
    pub fn anonymous() -> Self {
        Self {
            state: TenancyState::Anonymous,
            identity: None,
            workspace_id: None,
            role: None,
            workspace: None,
            is_master: false,
        }
    }

    fn unprovisioned(identity: Identity, is_master: bool) -> Self {
        Self {
            state: TenancyState::Unprovisioned,
            identity: Some(identity),
            workspace_id: None,
            role: None,
            workspace: None,
            is_master,
        }
    }

    fn resolved(identity: Identity, membership: MembershipRow, is_master: bool) -> Self {
        Self {
            state: TenancyState::Resolved,
            identity: Some(identity),
            workspace_id: Some(membership.workspace_id),
            role: Some(membership.role),
            workspace: Some(membership.workspace),
            is_master,
        }
    }

    pub fn require_identity(&self) -> OracleResult<&Identity> {
        self.identity.as_ref().ok_or(OracleError::Unauthenticated)
    }

    /// The caller, the active workspace id and the caller's role in it.
    pub fn require_workspace(&self) -> OracleResult<(&Identity, &str, Role)> {
        let identity = self.require_identity()?;
        match (&self.workspace_id, self.role) {
            (Some(workspace_id), Some(role)) => Ok((identity, workspace_id.as_str(), role)),
            _ => Err(OracleError::NoTenant),
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.role.is_some_and(|r| r.is_elevated())
    }
}

pub struct TenancyResolver<'a> {
    store: &'a OracleStore,
    config: &'a OracleConfig,
}

impl<'a> TenancyResolver<'a> {
    pub fn new(store: &'a OracleStore, config: &'a OracleConfig) -> Self {
        Self { store, config }
    }

    pub fn resolve(
        &self,
        identity: &dyn IdentityProvider,
        pointer: &mut dyn WorkspacePointer,
        scope: RouteScope,
    ) -> OracleResult<TenantContext> {
        let Some(identity) = current_identity(identity) else {
            return match scope {
                RouteScope::Anonymous => Ok(TenantContext::anonymous()),
                _ => Err(OracleError::Unauthenticated),
            };
        };
        let is_master = self.config.is_master_email(&identity.email);

        if scope == RouteScope::Master {
            if !is_master {
                return Err(OracleError::forbidden("master area is restricted"));
            }
            return Ok(TenantContext {
                state: TenancyState::Master,
                identity: Some(identity),
                workspace_id: None,
                role: None,
                workspace: None,
                is_master: true,
            });
        }

        let mut memberships = self.store.memberships_for_user(&identity.id)?;
        let forced = self.apply_policy(&identity, &mut memberships)?;

        let stored = pointer.get();
        let preferred = forced.as_deref().or(stored.as_deref());
        let active = choose_active(&memberships, preferred).cloned();

        match &active {
            Some(m) if stored.as_deref() != Some(m.workspace_id.as_str()) => {
                log::debug!(
                    "tenancy: user={} pointer {:?} -> {}",
                    identity.id,
                    stored,
                    m.workspace_id
                );
                pointer.set(&m.workspace_id);
            }
            None if stored.is_some() => {
                log::debug!("tenancy: user={} clearing stale pointer {:?}", identity.id, stored);
                pointer.clear();
            }
            _ => {}
        }

        match active {
            Some(membership) => {
                log::debug!(
                    "tenancy: user={} resolved workspace={} role={}",
                    identity.id,
                    membership.workspace_id,
                    membership.role
                );
                Ok(TenantContext::resolved(identity, membership, is_master))
            }
            None if scope == RouteScope::Tenant => Err(OracleError::NoTenant),
            None => Ok(TenantContext::unprovisioned(identity, is_master)),
        }
    }

    /// Run the provisioning policy. Returns a workspace id that must be
    /// active regardless of the pointer, when the policy imposes one.
    fn apply_policy(
        &self,
        identity: &Identity,
        memberships: &mut Vec<MembershipRow>,
    ) -> OracleResult<Option<WorkspaceId>> {
        match &self.config.provisioning {
            ProvisioningPolicy::NoProvision => Ok(None),

            ProvisioningPolicy::GlobalAutoJoin { workspace_id } => {
                if memberships.iter().any(|m| &m.workspace_id == workspace_id) {
                    return Ok(Some(workspace_id.clone()));
                }
                let inserted = self
                    .store
                    .add_membership(workspace_id, &identity.id, Role::Client)
                    .map_err(provisioning_failure)?;
                if inserted {
                    log::info!(
                        "provisioning: user={} joined global workspace={} as client",
                        identity.id,
                        workspace_id
                    );
                }
                *memberships = self
                    .store
                    .memberships_for_user(&identity.id)
                    .map_err(provisioning_failure)?;
                if !memberships.iter().any(|m| &m.workspace_id == workspace_id) {
                    return Err(OracleError::ProvisioningFailure {
                        reason: format!("membership in {workspace_id} missing after upsert"),
                    });
                }
                Ok(Some(workspace_id.clone()))
            }

            ProvisioningPolicy::PersonalAutoCreate => {
                if !memberships.is_empty() {
                    return Ok(None);
                }
                let name = personal_workspace_name(identity, &self.config.personal_workspace_suffix);
                let created = self
                    .store
                    .provision_personal_workspace(&identity.id, &name)
                    .map_err(provisioning_failure)?;
                if created {
                    log::info!(
                        "provisioning: user={} got personal workspace '{}'",
                        identity.id,
                        name
                    );
                }
                *memberships = self
                    .store
                    .memberships_for_user(&identity.id)
                    .map_err(provisioning_failure)?;
                if memberships.is_empty() {
                    return Err(OracleError::ProvisioningFailure {
                        reason: "no membership after personal workspace creation".into(),
                    });
                }
                Ok(None)
            }
        }
    }
}

/// Membership named by `preferred`, else the first one.
fn choose_active<'m>(
    memberships: &'m [MembershipRow],
    preferred: Option<&str>,
) -> Option<&'m MembershipRow> {
    preferred
        .and_then(|id| memberships.iter().find(|m| m.workspace_id == id))
        .or_else(|| memberships.first())
}

fn personal_workspace_name(identity: &Identity, suffix: &str) -> String {
    let local = identity.email.split('@').next().unwrap_or_default().trim();
    if local.is_empty() {
        "Personal workspace".to_string()
    } else {
        format!("{local}{suffix}")
    }
}

fn provisioning_failure(err: OracleError) -> OracleError {
    log::warn!("provisioning failed: {err}");
    OracleError::ProvisioningFailure {
        reason: err.to_string(),
    }
}
