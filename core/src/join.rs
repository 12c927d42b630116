//! Join flow: turn an access code into a workspace membership.

use crate::{
    error::{OracleError, OracleResult},
    store::OracleStore,
    tenancy::TenantContext,
    types::{Role, WorkspaceId},
};

/// Redeem `code` for the caller. Re-redeeming a code for a workspace the
/// caller already belongs to keeps the existing role.
pub fn redeem_access_code(
    store: &OracleStore,
    ctx: &TenantContext,
    code: &str,
) -> OracleResult<(WorkspaceId, Role)> {
    let identity = ctx.require_identity()?;
    let code = code.trim();
    if code.is_empty() {
        return Err(OracleError::invalid_input("enter an access code"));
    }
    let (workspace_id, granted) = store
        .redeem_access_code(code, &identity.id)?
        .ok_or_else(|| OracleError::invalid_input("invalid access code"))?;
    let role = store
        .membership_role(&workspace_id, &identity.id)?
        .unwrap_or(granted);
    log::info!(
        "user={} joined workspace={} as {} via access code",
        identity.id,
        workspace_id,
        role
    );
    Ok((workspace_id, role))
}
