//! Person profile queries.

use super::{json_column, OracleStore, PersonRow, PersonSummary};
use crate::{
    error::OracleResult,
    types::{new_id, now_timestamp, EntityId, UserId},
};
use rusqlite::{params, OptionalExtension};

impl OracleStore {
    pub fn insert_person(
        &self,
        workspace_id: &str,
        created_by_user_id: &str,
        name: &str,
        notes: Option<&str>,
        tags: &[String],
    ) -> OracleResult<EntityId> {
        let person_id = new_id();
        let now = now_timestamp();
        self.conn.execute(
            "INSERT INTO person (
                person_id, workspace_id, created_by_user_id, name, notes, tags,
                archived, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
            params![
                person_id,
                workspace_id,
                created_by_user_id,
                name,
                notes,
                serde_json::to_string(tags)?,
                now,
            ],
        )?;
        Ok(person_id)
    }

    /// A non-archived person in `workspace_id`.
    pub fn active_person(&self, workspace_id: &str, person_id: &str) -> OracleResult<Option<PersonRow>> {
        let person = self
            .conn
            .query_row(
                "SELECT person_id, workspace_id, created_by_user_id, name, notes, tags,
                        archived, created_at
                 FROM person
                 WHERE workspace_id = ?1 AND person_id = ?2 AND archived = 0",
                params![workspace_id, person_id],
                |row| {
                    Ok(PersonRow {
                        person_id: row.get(0)?,
                        workspace_id: row.get(1)?,
                        created_by_user_id: row.get(2)?,
                        name: row.get(3)?,
                        notes: row.get(4)?,
                        tags: json_column(row, 5)?,
                        archived: row.get::<_, i32>(6)? != 0,
                        created_at: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(person)
    }

    /// Creator of a person, regardless of workspace or archive state.
    pub fn person_creator(&self, person_id: &str) -> OracleResult<Option<UserId>> {
        let creator = self
            .conn
            .query_row(
                "SELECT created_by_user_id FROM person WHERE person_id = ?1",
                params![person_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(creator)
    }

    pub fn active_person_name_taken(&self, created_by_user_id: &str, name: &str) -> OracleResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM person
                 WHERE created_by_user_id = ?1 AND name = ?2 AND archived = 0
                 LIMIT 1",
                params![created_by_user_id, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Non-archived persons created by `created_by_user_id`, newest first,
    /// with the number of readings owned by each.
    pub fn persons_created_by(
        &self,
        workspace_id: &str,
        created_by_user_id: &str,
    ) -> OracleResult<Vec<PersonSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.person_id, p.name, p.tags, p.created_at,
                    (SELECT COUNT(*) FROM reading r WHERE r.owner_person_id = p.person_id)
             FROM person p
             WHERE p.workspace_id = ?1 AND p.created_by_user_id = ?2 AND p.archived = 0
             ORDER BY p.created_at DESC, p.person_id DESC",
        )?;
        let rows = stmt.query_map(params![workspace_id, created_by_user_id], |row| {
            Ok(PersonSummary {
                person_id: row.get(0)?,
                name: row.get(1)?,
                tags: json_column(row, 2)?,
                created_at: row.get(3)?,
                reading_count: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn archive_person(&self, person_id: &str) -> OracleResult<bool> {
        let changed = self.conn.execute(
            "UPDATE person SET archived = 1, updated_at = ?1 WHERE person_id = ?2 AND archived = 0",
            params![now_timestamp(), person_id],
        )?;
        Ok(changed == 1)
    }
}
