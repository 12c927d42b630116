//! Deck, card and spread queries.

use super::{CardRow, DeckRow, NewCard, OracleStore, SpreadPositionRow, SpreadRow};
use crate::{
    error::OracleResult,
    types::{new_id, now_timestamp, ContentStatus, EntityId},
};
use rusqlite::{params, OptionalExtension};

impl OracleStore {
    // ── Deck ──────────────────────────────────────────────────────

    pub fn insert_deck(
        &self,
        workspace_id: &str,
        name: &str,
        status: ContentStatus,
    ) -> OracleResult<EntityId> {
        let deck_id = new_id();
        let now = now_timestamp();
        self.conn.execute(
            "INSERT INTO deck (deck_id, workspace_id, name, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![deck_id, workspace_id, name, status, now],
        )?;
        Ok(deck_id)
    }

    pub fn deck_in_workspace(&self, workspace_id: &str, deck_id: &str) -> OracleResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM deck WHERE workspace_id = ?1 AND deck_id = ?2",
                params![workspace_id, deck_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn deck_id_by_name(&self, workspace_id: &str, name: &str) -> OracleResult<Option<EntityId>> {
        let deck_id = self
            .conn
            .query_row(
                "SELECT deck_id FROM deck WHERE workspace_id = ?1 AND name = ?2
                 ORDER BY created_at ASC LIMIT 1",
                params![workspace_id, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(deck_id)
    }

    pub fn spread_id_by_name(&self, workspace_id: &str, name: &str) -> OracleResult<Option<EntityId>> {
        let spread_id = self
            .conn
            .query_row(
                "SELECT spread_id FROM spread WHERE workspace_id = ?1 AND name = ?2
                 ORDER BY created_at ASC LIMIT 1",
                params![workspace_id, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(spread_id)
    }

    pub fn published_decks(&self, workspace_id: &str) -> OracleResult<Vec<DeckRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT deck_id, name FROM deck
             WHERE workspace_id = ?1 AND status = 'published'
             ORDER BY name ASC",
        )?;
        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok(DeckRow {
                deck_id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Card ──────────────────────────────────────────────────────

    pub fn insert_card(&self, workspace_id: &str, card: &NewCard) -> OracleResult<EntityId> {
        let card_id = new_id();
        let now = now_timestamp();
        self.conn.execute(
            "INSERT INTO card (
                card_id, workspace_id, deck_id, name, image_path, short_message,
                meaning, meaning_extended, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                card_id,
                workspace_id,
                card.deck_id,
                card.name,
                card.image_path,
                card.short_message,
                card.meaning,
                card.meaning_extended,
                card.status,
                now,
            ],
        )?;
        Ok(card_id)
    }

    /// Catalog edit. Existing reading snapshots are not touched.
    pub fn update_card_text(
        &self,
        card_id: &str,
        name: &str,
        short_message: &str,
        meaning: &str,
    ) -> OracleResult<()> {
        self.conn.execute(
            "UPDATE card SET name = ?1, short_message = ?2, meaning = ?3, updated_at = ?4
             WHERE card_id = ?5",
            params![name, short_message, meaning, now_timestamp(), card_id],
        )?;
        Ok(())
    }

    pub fn delete_card(&self, card_id: &str) -> OracleResult<()> {
        self.conn
            .execute("DELETE FROM card WHERE card_id = ?1", params![card_id])?;
        Ok(())
    }

    /// The draw pool: published cards of the workspace, optionally limited
    /// to one deck. Enumeration order is stable (creation time, then id),
    /// which keeps replays of a stored seed comparable.
    pub fn published_cards(
        &self,
        workspace_id: &str,
        deck_id: Option<&str>,
    ) -> OracleResult<Vec<CardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT card_id, deck_id, name, image_path, short_message, meaning, meaning_extended
             FROM card
             WHERE workspace_id = ?1 AND status = 'published'
               AND (?2 IS NULL OR deck_id = ?2)
             ORDER BY created_at ASC, card_id ASC",
        )?;
        let rows = stmt.query_map(params![workspace_id, deck_id], |row| {
            Ok(CardRow {
                card_id: row.get(0)?,
                deck_id: row.get(1)?,
                name: row.get(2)?,
                image_path: row.get(3)?,
                short_message: row.get(4)?,
                meaning: row.get(5)?,
                meaning_extended: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Spread ────────────────────────────────────────────────────

    /// Insert a spread and one position row per title (1-based).
    pub fn insert_spread(
        &self,
        workspace_id: &str,
        name: &str,
        card_count: i64,
        status: ContentStatus,
        position_titles: &[&str],
    ) -> OracleResult<EntityId> {
        let spread_id = new_id();
        let now = now_timestamp();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO spread (spread_id, workspace_id, name, card_count, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![spread_id, workspace_id, name, card_count, status, now],
        )?;
        for (idx, title) in position_titles.iter().enumerate() {
            tx.execute(
                "INSERT INTO spread_position (spread_id, position_index, title)
                 VALUES (?1, ?2, ?3)",
                params![spread_id, (idx + 1) as i64, title],
            )?;
        }
        tx.commit()?;
        Ok(spread_id)
    }

    pub fn published_spread(
        &self,
        workspace_id: &str,
        spread_id: &str,
    ) -> OracleResult<Option<SpreadRow>> {
        let spread = self
            .conn
            .query_row(
                "SELECT spread_id, workspace_id, name, card_count FROM spread
                 WHERE workspace_id = ?1 AND spread_id = ?2 AND status = 'published'",
                params![workspace_id, spread_id],
                |row| {
                    Ok(SpreadRow {
                        spread_id: row.get(0)?,
                        workspace_id: row.get(1)?,
                        name: row.get(2)?,
                        card_count: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(spread)
    }

    pub fn published_spreads(&self, workspace_id: &str) -> OracleResult<Vec<SpreadRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT spread_id, workspace_id, name, card_count FROM spread
             WHERE workspace_id = ?1 AND status = 'published'
             ORDER BY card_count ASC, name ASC",
        )?;
        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok(SpreadRow {
                spread_id: row.get(0)?,
                workspace_id: row.get(1)?,
                name: row.get(2)?,
                card_count: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn spread_positions(&self, spread_id: &str) -> OracleResult<Vec<SpreadPositionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT position_index, title, description FROM spread_position
             WHERE spread_id = ?1 ORDER BY position_index ASC",
        )?;
        let rows = stmt.query_map(params![spread_id], |row| {
            Ok(SpreadPositionRow {
                position_index: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
