//! Elevated data-access handle.
//!
//! Built exactly once at process startup and passed by reference to every
//! component that needs to read past the caller's own scope. There is no
//! global instance; a component without an `&AdminStore` cannot take the
//! elevated path.

use crate::{
    config::normalize_email,
    error::{OracleError, OracleResult},
    store::{AllowedEmailRow, OracleStore},
    types::{EntityId, UserId},
};

pub struct AdminStore {
    store: OracleStore,
}

impl AdminStore {
    /// Open a dedicated connection to the database at `path`.
    pub fn open(path: &str) -> OracleResult<Self> {
        Ok(Self {
            store: OracleStore::open(path)?,
        })
    }

    /// Open a dedicated connection to the same database as `store`.
    pub fn attach(store: &OracleStore) -> OracleResult<Self> {
        Ok(Self {
            store: store.reopen()?,
        })
    }

    /// Creator of a person profile, read without workspace scoping.
    pub fn person_creator(&self, person_id: &str) -> OracleResult<Option<UserId>> {
        self.store.person_creator(person_id)
    }

    // ── Allowed emails (master area) ──────────────────────────────

    pub fn allowed_emails(&self) -> OracleResult<Vec<AllowedEmailRow>> {
        self.store.allowed_emails()
    }

    pub fn is_email_enabled(&self, email: &str) -> OracleResult<bool> {
        self.store.is_email_enabled(&normalize_email(email))
    }

    pub fn add_allowed_email(&self, email: &str) -> OracleResult<EntityId> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(OracleError::invalid_input("enter a valid email"));
        }
        self.store.insert_allowed_email(&email)
    }

    pub fn allowed_email(&self, allowed_email_id: &str) -> OracleResult<Option<AllowedEmailRow>> {
        self.store.allowed_email(allowed_email_id)
    }

    pub fn set_allowed_email_enabled(&self, allowed_email_id: &str, enabled: bool) -> OracleResult<()> {
        if self.store.set_allowed_email_enabled(allowed_email_id, enabled)? {
            Ok(())
        } else {
            Err(OracleError::not_found("allowed email", allowed_email_id))
        }
    }

    pub fn delete_allowed_email(&self, allowed_email_id: &str) -> OracleResult<()> {
        if self.store.delete_allowed_email(allowed_email_id)? {
            Ok(())
        } else {
            Err(OracleError::not_found("allowed email", allowed_email_id))
        }
    }
}
