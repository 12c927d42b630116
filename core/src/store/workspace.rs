//! Workspace and membership queries.

use super::{MembershipRow, OracleStore};
use crate::{
    error::OracleResult,
    types::{new_id, now_timestamp, Role, Workspace},
};
use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};

impl OracleStore {
    // ── Workspace ─────────────────────────────────────────────────

    pub fn insert_workspace(&self, name: &str, slug: Option<&str>) -> OracleResult<Workspace> {
        self.insert_workspace_with_id(&new_id(), name, slug)
    }

    /// Insert a workspace under a caller-chosen id (e.g. the designated
    /// global workspace named in config).
    pub fn insert_workspace_with_id(
        &self,
        workspace_id: &str,
        name: &str,
        slug: Option<&str>,
    ) -> OracleResult<Workspace> {
        let now = now_timestamp();
        self.conn.execute(
            "INSERT INTO workspace (workspace_id, name, slug, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![workspace_id, name, slug, now],
        )?;
        Ok(Workspace {
            id: workspace_id.to_string(),
            name: name.to_string(),
            slug: slug.map(String::from),
        })
    }

    /// Create a workspace with `user_id` as its owner, as one unit.
    pub fn insert_workspace_with_owner(&self, name: &str, user_id: &str) -> OracleResult<Workspace> {
        let workspace_id = new_id();
        let now = now_timestamp();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO workspace (workspace_id, name, slug, created_at, updated_at)
             VALUES (?1, ?2, NULL, ?3, ?3)",
            params![workspace_id, name, now],
        )?;
        tx.execute(
            "INSERT INTO workspace_member (workspace_id, user_id, role, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![workspace_id, user_id, Role::Owner, now],
        )?;
        tx.commit()?;
        Ok(Workspace {
            id: workspace_id,
            name: name.to_string(),
            slug: None,
        })
    }

    pub fn get_workspace(&self, workspace_id: &str) -> OracleResult<Option<Workspace>> {
        let ws = self
            .conn
            .query_row(
                "SELECT workspace_id, name, slug FROM workspace WHERE workspace_id = ?1",
                params![workspace_id],
                |row| {
                    Ok(Workspace {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(ws)
    }

    pub fn workspace_count(&self) -> OracleResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM workspace", [], |row| row.get(0))?)
    }

    // ── Membership ────────────────────────────────────────────────

    /// All memberships of `user_id` with their workspace summaries.
    /// Callers must not treat the first row as canonical.
    pub fn memberships_for_user(&self, user_id: &str) -> OracleResult<Vec<MembershipRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.workspace_id, m.role, w.name, w.slug
             FROM workspace_member m
             JOIN workspace w ON w.workspace_id = m.workspace_id
             WHERE m.user_id = ?1
             ORDER BY m.created_at ASC, m.workspace_id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let workspace_id: String = row.get(0)?;
            Ok(MembershipRow {
                workspace: Workspace {
                    id: workspace_id.clone(),
                    name: row.get(2)?,
                    slug: row.get(3)?,
                },
                workspace_id,
                role: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn membership_role(&self, workspace_id: &str, user_id: &str) -> OracleResult<Option<Role>> {
        let role = self
            .conn
            .query_row(
                "SELECT role FROM workspace_member WHERE workspace_id = ?1 AND user_id = ?2",
                params![workspace_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(role)
    }

    /// Idempotent membership insert. Returns true when a row was created;
    /// an existing membership (and its role) is left untouched.
    pub fn add_membership(&self, workspace_id: &str, user_id: &str, role: Role) -> OracleResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO workspace_member (workspace_id, user_id, role, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (workspace_id, user_id) DO NOTHING",
            params![workspace_id, user_id, role, now_timestamp()],
        )?;
        Ok(inserted == 1)
    }

    pub fn membership_count_for_user(&self, user_id: &str) -> OracleResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM workspace_member WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    /// Create the identity's personal workspace and owner membership as
    /// one unit.
    ///
    /// Runs in an IMMEDIATE transaction so concurrent provisioning for the
    /// same identity serializes: the membership check, the workspace insert
    /// (unique on `personal_owner_id`) and the membership insert either all
    /// land or none do. Returns false when the identity already had a
    /// membership by the time the write lock was taken.
    pub fn provision_personal_workspace(&self, user_id: &str, name: &str) -> OracleResult<bool> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM workspace_member WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            tx.commit()?;
            return Ok(false);
        }

        let now = now_timestamp();
        tx.execute(
            "INSERT INTO workspace (workspace_id, name, slug, personal_owner_id, created_at, updated_at)
             VALUES (?1, ?2, NULL, ?3, ?4, ?4)
             ON CONFLICT (personal_owner_id) DO NOTHING",
            params![new_id(), name, user_id, now],
        )?;
        let workspace_id: String = tx.query_row(
            "SELECT workspace_id FROM workspace WHERE personal_owner_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO workspace_member (workspace_id, user_id, role, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (workspace_id, user_id) DO NOTHING",
            params![workspace_id, user_id, Role::Owner, now],
        )?;
        tx.commit()?;
        Ok(true)
    }

    pub fn personal_workspace_count(&self, user_id: &str) -> OracleResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM workspace WHERE personal_owner_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }
}
