//! Identity collaborator boundary.
//!
//! The core never authenticates anyone itself. It asks an
//! [`IdentityProvider`] who is calling and treats any provider failure
//! as an anonymous caller.

use crate::{admin::AdminStore, config::OracleConfig, types::Identity};

pub trait IdentityProvider {
    /// The identity bound to the current session, if any.
    fn resolve_session(&self) -> anyhow::Result<Option<Identity>>;
}

/// Resolve the session, degrading provider errors to "no identity".
pub fn current_identity(provider: &dyn IdentityProvider) -> Option<Identity> {
    match provider.resolve_session() {
        Ok(identity) => identity,
        Err(e) => {
            log::warn!("identity provider failed, continuing anonymously: {e}");
            None
        }
    }
}

/// A provider that always answers with the same identity (or none).
/// Used by the runner, where the caller is named on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    identity: Option<Identity>,
}

impl StaticIdentity {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn resolve_session(&self) -> anyhow::Result<Option<Identity>> {
        Ok(self.identity.clone())
    }
}

/// Admits only identities whose email is enabled on the allow-list, plus
/// the master identity. Everyone else resolves as signed out.
pub struct AllowListedIdentity<'a> {
    inner: &'a dyn IdentityProvider,
    admin: &'a AdminStore,
    config: &'a OracleConfig,
}

impl<'a> AllowListedIdentity<'a> {
    pub fn new(
        inner: &'a dyn IdentityProvider,
        admin: &'a AdminStore,
        config: &'a OracleConfig,
    ) -> Self {
        Self {
            inner,
            admin,
            config,
        }
    }
}

impl IdentityProvider for AllowListedIdentity<'_> {
    fn resolve_session(&self) -> anyhow::Result<Option<Identity>> {
        let Some(identity) = self.inner.resolve_session()? else {
            return Ok(None);
        };
        if self.config.is_master_email(&identity.email)
            || self.admin.is_email_enabled(&identity.email)?
        {
            return Ok(Some(identity));
        }
        log::warn!(
            "user={} signed in with an email that is not allowed, treating as anonymous",
            identity.id
        );
        Ok(None)
    }
}
