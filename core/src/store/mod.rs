//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Resolver and services call store methods; they never execute SQL directly.
//! Every multi-row write that must be all-or-nothing runs in one transaction
//! here, never as a sequence of calls from the caller.

use crate::{
    error::OracleResult,
    snapshot::ItemSnapshot,
    types::{now_timestamp, ContentStatus, EntityId, OwnerType, Role, UserId, Workspace, WorkspaceId},
};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::time::Duration;

mod access;
mod catalog;
mod person;
mod reading;
mod workspace;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct OracleStore {
    conn: Connection,
    path: String,
}

impl OracleStore {
    pub fn open(path: &str) -> OracleResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory databases ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    /// Open a private shared-cache in-memory database (used in tests).
    /// Connections made with [`OracleStore::reopen`] see the same data for
    /// as long as this store is alive.
    pub fn in_memory() -> OracleResult<Self> {
        let name = uuid::Uuid::new_v4().simple().to_string();
        Self::open(&format!("file:oracle_{name}?mode=memory&cache=shared"))
    }

    /// Open a second connection to the same database.
    pub fn reopen(&self) -> OracleResult<Self> {
        Self::open(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Apply all schema migrations in order. Safe to run repeatedly.
    pub fn migrate(&self) -> OracleResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_catalog.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_readings.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_access.sql"))?;
        Ok(())
    }
}

/// One membership joined with its workspace summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRow {
    pub workspace_id: WorkspaceId,
    pub role: Role,
    pub workspace: Workspace,
}

#[derive(Debug, Clone)]
pub struct NewCard {
    pub deck_id: Option<EntityId>,
    pub name: String,
    pub image_path: Option<String>,
    pub short_message: String,
    pub meaning: String,
    pub meaning_extended: Option<String>,
    pub status: ContentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub card_id: EntityId,
    pub deck_id: Option<EntityId>,
    pub name: String,
    pub image_path: Option<String>,
    pub short_message: String,
    pub meaning: String,
    pub meaning_extended: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckRow {
    pub deck_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadRow {
    pub spread_id: EntityId,
    pub workspace_id: WorkspaceId,
    pub name: String,
    pub card_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadPositionRow {
    pub position_index: i64,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub person_id: EntityId,
    pub workspace_id: WorkspaceId,
    pub created_by_user_id: UserId,
    pub name: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub archived: bool,
    pub created_at: String,
}

/// A person profile as listed for its creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonSummary {
    pub person_id: EntityId,
    pub name: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub reading_count: i64,
}

/// Insert payload for a reading. Build with [`NewReading::for_user`] or
/// [`NewReading::for_person`] so the owner columns always agree with
/// `owner_type`.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub reading_id: EntityId,
    pub workspace_id: WorkspaceId,
    owner_type: OwnerType,
    owner_user_id: Option<UserId>,
    owner_person_id: Option<EntityId>,
    pub created_by_user_id: UserId,
    pub spread_id: EntityId,
    pub selected_deck_ids: Option<Vec<EntityId>>,
    pub random_seed: String,
    pub created_at: String,
}

impl NewReading {
    pub fn for_user(
        reading_id: EntityId,
        workspace_id: WorkspaceId,
        spread_id: EntityId,
        user_id: UserId,
    ) -> Self {
        Self {
            random_seed: reading_id.clone(),
            reading_id,
            workspace_id,
            owner_type: OwnerType::User,
            owner_user_id: Some(user_id.clone()),
            owner_person_id: None,
            created_by_user_id: user_id,
            spread_id,
            selected_deck_ids: None,
            created_at: now_timestamp(),
        }
    }

    pub fn for_person(
        reading_id: EntityId,
        workspace_id: WorkspaceId,
        spread_id: EntityId,
        created_by: UserId,
        person_id: EntityId,
    ) -> Self {
        Self {
            random_seed: reading_id.clone(),
            reading_id,
            workspace_id,
            owner_type: OwnerType::Person,
            owner_user_id: None,
            owner_person_id: Some(person_id),
            created_by_user_id: created_by,
            spread_id,
            selected_deck_ids: None,
            created_at: now_timestamp(),
        }
    }

    pub fn owner_type(&self) -> OwnerType {
        self.owner_type
    }
}

#[derive(Debug, Clone)]
pub struct NewReadingItem {
    pub position_index: i64,
    pub card_id: EntityId,
    pub snapshot: ItemSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingRow {
    pub reading_id: EntityId,
    pub workspace_id: WorkspaceId,
    pub owner_type: OwnerType,
    pub owner_user_id: Option<UserId>,
    pub owner_person_id: Option<EntityId>,
    pub created_by_user_id: UserId,
    pub spread_id: EntityId,
    pub spread_name: String,
    pub selected_deck_ids: Option<Vec<EntityId>>,
    pub random_seed: String,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingItemRow {
    pub position_index: i64,
    pub card_id: EntityId,
    pub snapshot: ItemSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowedEmailRow {
    pub allowed_email_id: EntityId,
    pub email: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Decode a JSON text column inside a row-mapping closure.
fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
