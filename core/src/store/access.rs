//! Access code and allowed-email queries.

use super::{is_constraint_violation, AllowedEmailRow, OracleStore};
use crate::{
    error::{OracleError, OracleResult},
    types::{new_id, now_timestamp, EntityId, Role, WorkspaceId},
};
use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};

impl OracleStore {
    // ── Access code ───────────────────────────────────────────────

    pub fn insert_access_code(
        &self,
        code: &str,
        workspace_id: &str,
        role: Role,
        max_uses: Option<i64>,
    ) -> OracleResult<()> {
        self.conn.execute(
            "INSERT INTO access_code (code, workspace_id, role, max_uses, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![code, workspace_id, role, max_uses, now_timestamp()],
        )?;
        Ok(())
    }

    pub fn access_code_uses(&self, code: &str) -> OracleResult<Option<i64>> {
        let uses = self
            .conn
            .query_row(
                "SELECT uses FROM access_code WHERE code = ?1",
                params![code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(uses)
    }

    pub fn disable_access_code(&self, code: &str) -> OracleResult<()> {
        self.conn
            .execute("UPDATE access_code SET enabled = 0 WHERE code = ?1", params![code])?;
        Ok(())
    }

    /// Redeem `code` for `user_id`: add the membership (if missing) and
    /// count the use, atomically. Returns None for unknown, disabled or
    /// exhausted codes.
    ///
    /// IMMEDIATE so the use-count check and the write see the same state
    /// when several redemptions race.
    pub fn redeem_access_code(
        &self,
        code: &str,
        user_id: &str,
    ) -> OracleResult<Option<(WorkspaceId, Role)>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let grant: Option<(WorkspaceId, Role)> = tx
            .query_row(
                "SELECT workspace_id, role FROM access_code
                 WHERE code = ?1 AND enabled = 1
                   AND (max_uses IS NULL OR uses < max_uses)",
                params![code],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((workspace_id, role)) = grant else {
            return Ok(None);
        };

        let inserted = tx.execute(
            "INSERT INTO workspace_member (workspace_id, user_id, role, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (workspace_id, user_id) DO NOTHING",
            params![workspace_id, user_id, role, now_timestamp()],
        )?;
        if inserted == 1 {
            tx.execute(
                "UPDATE access_code SET uses = uses + 1 WHERE code = ?1",
                params![code],
            )?;
        }
        tx.commit()?;
        Ok(Some((workspace_id, role)))
    }

    // ── Allowed email ─────────────────────────────────────────────

    pub fn allowed_emails(&self) -> OracleResult<Vec<AllowedEmailRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT allowed_email_id, email, enabled, created_at, updated_at
             FROM allowed_email ORDER BY email ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AllowedEmailRow {
                allowed_email_id: row.get(0)?,
                email: row.get(1)?,
                enabled: row.get::<_, i32>(2)? != 0,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn insert_allowed_email(&self, email: &str) -> OracleResult<EntityId> {
        let id = new_id();
        let now = now_timestamp();
        let result = self.conn.execute(
            "INSERT INTO allowed_email (allowed_email_id, email, enabled, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?3)",
            params![id, email, now],
        );
        match result {
            Ok(_) => Ok(id),
            Err(e) if is_constraint_violation(&e) => Err(OracleError::Conflict {
                message: format!("{email} is already on the list"),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn allowed_email(&self, allowed_email_id: &str) -> OracleResult<Option<AllowedEmailRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT allowed_email_id, email, enabled, created_at, updated_at
                 FROM allowed_email WHERE allowed_email_id = ?1",
                params![allowed_email_id],
                |row| {
                    Ok(AllowedEmailRow {
                        allowed_email_id: row.get(0)?,
                        email: row.get(1)?,
                        enabled: row.get::<_, i32>(2)? != 0,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn set_allowed_email_enabled(&self, allowed_email_id: &str, enabled: bool) -> OracleResult<bool> {
        let changed = self.conn.execute(
            "UPDATE allowed_email SET enabled = ?1, updated_at = ?2 WHERE allowed_email_id = ?3",
            params![enabled, now_timestamp(), allowed_email_id],
        )?;
        Ok(changed == 1)
    }

    pub fn delete_allowed_email(&self, allowed_email_id: &str) -> OracleResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM allowed_email WHERE allowed_email_id = ?1",
            params![allowed_email_id],
        )?;
        Ok(changed == 1)
    }

    pub fn is_email_enabled(&self, email: &str) -> OracleResult<bool> {
        let enabled: Option<i32> = self
            .conn
            .query_row(
                "SELECT enabled FROM allowed_email WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        Ok(enabled == Some(1))
    }
}
