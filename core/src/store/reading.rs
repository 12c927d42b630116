//! Reading and reading item queries.

use super::{json_column, NewReading, NewReadingItem, OracleStore, ReadingItemRow, ReadingRow};
use crate::{error::OracleResult, types::now_timestamp};
use rusqlite::{params, OptionalExtension, Row};

const READING_COLUMNS: &str =
    "r.reading_id, r.workspace_id, r.owner_type, r.owner_user_id, r.owner_person_id,
     r.created_by_user_id, r.spread_id, s.name, r.selected_deck_ids, r.random_seed,
     r.note, r.created_at";

fn reading_from_row(row: &Row<'_>) -> rusqlite::Result<ReadingRow> {
    let deck_ids: Option<String> = row.get(8)?;
    let selected_deck_ids = match deck_ids {
        Some(_) => Some(json_column(row, 8)?),
        None => None,
    };
    Ok(ReadingRow {
        reading_id: row.get(0)?,
        workspace_id: row.get(1)?,
        owner_type: row.get(2)?,
        owner_user_id: row.get(3)?,
        owner_person_id: row.get(4)?,
        created_by_user_id: row.get(5)?,
        spread_id: row.get(6)?,
        spread_name: row.get(7)?,
        selected_deck_ids,
        random_seed: row.get(9)?,
        note: row.get(10)?,
        created_at: row.get(11)?,
    })
}

impl OracleStore {
    /// Write a reading and all of its items in one transaction.
    /// Any failing insert rolls back the whole reading.
    pub fn insert_reading_with_items(
        &self,
        reading: &NewReading,
        items: &[NewReadingItem],
    ) -> OracleResult<()> {
        let selected_deck_ids = reading
            .selected_deck_ids
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO reading (
                reading_id, workspace_id, owner_type, owner_user_id, owner_person_id,
                created_by_user_id, spread_id, selected_deck_ids, random_seed, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                reading.reading_id,
                reading.workspace_id,
                reading.owner_type,
                reading.owner_user_id,
                reading.owner_person_id,
                reading.created_by_user_id,
                reading.spread_id,
                selected_deck_ids,
                reading.random_seed,
                reading.created_at,
            ],
        )?;
        let now = now_timestamp();
        for item in items {
            tx.execute(
                "INSERT INTO reading_item (reading_id, position_index, card_id, snapshot, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    reading.reading_id,
                    item.position_index,
                    item.card_id,
                    serde_json::to_string(&item.snapshot)?,
                    now,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn reading_in_workspace(
        &self,
        workspace_id: &str,
        reading_id: &str,
    ) -> OracleResult<Option<ReadingRow>> {
        let sql = format!(
            "SELECT {READING_COLUMNS}
             FROM reading r JOIN spread s ON s.spread_id = r.spread_id
             WHERE r.workspace_id = ?1 AND r.reading_id = ?2"
        );
        let reading = self
            .conn
            .query_row(&sql, params![workspace_id, reading_id], reading_from_row)
            .optional()?;
        Ok(reading)
    }

    pub fn reading_items(&self, reading_id: &str) -> OracleResult<Vec<ReadingItemRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT position_index, card_id, snapshot FROM reading_item
             WHERE reading_id = ?1 ORDER BY position_index ASC",
        )?;
        let rows = stmt.query_map(params![reading_id], |row| {
            Ok(ReadingItemRow {
                position_index: row.get(0)?,
                card_id: row.get(1)?,
                snapshot: json_column(row, 2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// One page of the workspace's readings, newest first. `before` is the
    /// `created_at` cursor returned with the previous page; `created_by`
    /// narrows the page to one creator.
    /// Keyset page ordered by `(created_at, reading_id)` descending.
    /// `before` is the `(created_at, reading_id)` of the last row already
    /// seen; rows sharing its timestamp are continued by id, not skipped.
    pub fn readings_page(
        &self,
        workspace_id: &str,
        created_by: Option<&str>,
        before: Option<(&str, &str)>,
        limit: u32,
    ) -> OracleResult<Vec<ReadingRow>> {
        let (before_at, before_id) = before.unzip();
        let sql = format!(
            "SELECT {READING_COLUMNS}
             FROM reading r JOIN spread s ON s.spread_id = r.spread_id
             WHERE r.workspace_id = ?1
               AND (?2 IS NULL OR r.created_by_user_id = ?2)
               AND (?3 IS NULL
                    OR r.created_at < ?3
                    OR (r.created_at = ?3 AND r.reading_id < ?4))
             ORDER BY r.created_at DESC, r.reading_id DESC
             LIMIT ?5"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![workspace_id, created_by, before_at, before_id, limit],
            reading_from_row,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn reading_count(&self, workspace_id: &str) -> OracleResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM reading WHERE workspace_id = ?1",
            params![workspace_id],
            |row| row.get(0),
        )?)
    }

    pub fn reading_item_count(&self, reading_id: &str) -> OracleResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM reading_item WHERE reading_id = ?1",
            params![reading_id],
            |row| row.get(0),
        )?)
    }

    pub fn total_reading_item_count(&self) -> OracleResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM reading_item", [], |row| row.get(0))?)
    }
}
