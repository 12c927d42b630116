//! Reading orchestration: authorize, draw, persist.
//!
//! A reading's id doubles as its draw seed. The draw itself is fresh for
//! every new reading (the id is a random v4 UUID), yet fully reproducible
//! later from the stored seed and the same pool enumeration.

use crate::{
    admin::AdminStore,
    error::{OracleError, OracleResult},
    sampler::sample_unique,
    snapshot::ItemSnapshot,
    store::{
        CardRow, NewReading, NewReadingItem, OracleStore, ReadingItemRow, ReadingRow,
        SpreadPositionRow, SpreadRow,
    },
    tenancy::TenantContext,
    types::{new_id, EntityId, Identity, Role},
};
use serde::{Deserialize, Serialize};

/// Inbound "create reading" payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingRequest {
    #[serde(default)]
    pub spread_id: String,
    #[serde(default)]
    pub deck_id: Option<EntityId>,
    #[serde(default)]
    pub person_id: Option<EntityId>,
}

impl CreateReadingRequest {
    pub fn for_spread(spread_id: &str) -> Self {
        Self {
            spread_id: spread_id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_deck(mut self, deck_id: &str) -> Self {
        self.deck_id = Some(deck_id.to_string());
        self
    }

    pub fn with_person(mut self, person_id: &str) -> Self {
        self.person_id = Some(person_id.to_string());
        self
    }
}

/// Cards drawn for one spread, in position order.
#[derive(Debug, Clone)]
pub struct Draw {
    pub spread: SpreadRow,
    pub positions: Vec<SpreadPositionRow>,
    pub cards: Vec<CardRow>,
}

impl Draw {
    fn into_items(self) -> Vec<NewReadingItem> {
        let positions = self.positions;
        self.cards
            .into_iter()
            .enumerate()
            .map(|(idx, card)| {
                let position_index = idx as i64 + 1;
                let position = positions.iter().find(|p| p.position_index == position_index);
                NewReadingItem {
                    position_index,
                    card_id: card.card_id.clone(),
                    snapshot: ItemSnapshot::capture(position_index, position, &card),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingDetail {
    pub reading: ReadingRow,
    pub items: Vec<ReadingItemRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub readings: Vec<ReadingDetail>,
    /// Pass back as `before` to fetch the next page.
    pub next_cursor: Option<String>,
}

/// Position of the last reading on a history page. Encoded as
/// `"{created_at}|{reading_id}"`; neither part can contain `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCursor {
    pub created_at: String,
    pub reading_id: EntityId,
}

impl HistoryCursor {
    fn after(reading: &ReadingRow) -> Self {
        Self {
            created_at: reading.created_at.clone(),
            reading_id: reading.reading_id.clone(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}|{}", self.created_at, self.reading_id)
    }

    pub fn decode(cursor: &str) -> OracleResult<Self> {
        match cursor.split_once('|') {
            Some((created_at, reading_id)) if !created_at.is_empty() && !reading_id.is_empty() => {
                Ok(Self {
                    created_at: created_at.to_string(),
                    reading_id: reading_id.to_string(),
                })
            }
            _ => Err(OracleError::invalid_input("malformed history cursor")),
        }
    }
}

pub struct ReadingService<'a> {
    store: &'a OracleStore,
    admin: &'a AdminStore,
}

impl<'a> ReadingService<'a> {
    pub fn new(store: &'a OracleStore, admin: &'a AdminStore) -> Self {
        Self { store, admin }
    }

    /// Create a reading for the caller, or for one of the workspace's
    /// person profiles when `person_id` is set. Returns the reading id.
    pub fn create_reading(
        &self,
        ctx: &TenantContext,
        request: &CreateReadingRequest,
    ) -> OracleResult<EntityId> {
        let (identity, workspace_id, role) = ctx.require_workspace()?;

        let spread_id = request.spread_id.trim();
        if spread_id.is_empty() {
            return Err(OracleError::invalid_input("spreadId is required"));
        }
        let deck_id = non_blank(request.deck_id.as_deref());
        let person_id = non_blank(request.person_id.as_deref());

        if let Some(person_id) = person_id {
            self.authorize_person(identity, workspace_id, role, person_id)?;
        }

        let reading_id = new_id();
        let draw = self.draw(workspace_id, spread_id, deck_id, &reading_id)?;

        let mut reading = match person_id {
            Some(person_id) => NewReading::for_person(
                reading_id.clone(),
                workspace_id.to_string(),
                draw.spread.spread_id.clone(),
                identity.id.clone(),
                person_id.to_string(),
            ),
            None => NewReading::for_user(
                reading_id.clone(),
                workspace_id.to_string(),
                draw.spread.spread_id.clone(),
                identity.id.clone(),
            ),
        };
        reading.selected_deck_ids = deck_id.map(|d| vec![d.to_string()]);

        let items = draw.into_items();
        let item_count = items.len();
        self.store
            .insert_reading_with_items(&reading, &items)
            .map_err(|e| {
                log::warn!("reading {reading_id}: write rolled back: {e}");
                OracleError::PersistenceFailure {
                    reason: e.to_string(),
                }
            })?;

        log::info!(
            "reading {} created: workspace={} owner={} items={}",
            reading_id,
            workspace_id,
            reading.owner_type().as_str(),
            item_count
        );
        Ok(reading_id)
    }

    /// Owner and staff may read for any person in the workspace. Anyone
    /// else only for persons they created; the creator is looked up through
    /// the admin handle because the caller's own scope may not expose it.
    fn authorize_person(
        &self,
        identity: &Identity,
        workspace_id: &str,
        role: Role,
        person_id: &str,
    ) -> OracleResult<()> {
        if !role.is_elevated() {
            let creator = self.admin.person_creator(person_id)?;
            if creator.as_deref() != Some(identity.id.as_str()) {
                log::warn!(
                    "user={} denied reading for person={} (creator {:?})",
                    identity.id,
                    person_id,
                    creator
                );
                return Err(OracleError::forbidden(
                    "not allowed to create readings for this person",
                ));
            }
        }
        if self.store.active_person(workspace_id, person_id)?.is_none() {
            return Err(OracleError::not_found("person", person_id));
        }
        Ok(())
    }

    /// Resolve the spread and pool, then draw with `seed`.
    pub fn draw(
        &self,
        workspace_id: &str,
        spread_id: &str,
        deck_id: Option<&str>,
        seed: &str,
    ) -> OracleResult<Draw> {
        let spread = self
            .store
            .published_spread(workspace_id, spread_id)?
            .ok_or_else(|| OracleError::not_found("spread", spread_id))?;
        if spread.card_count <= 0 {
            return Err(OracleError::DrawInputInvalid {
                reason: format!(
                    "spread '{}' has card_count {}",
                    spread.name, spread.card_count
                ),
            });
        }
        let count = spread.card_count as usize;

        if let Some(deck_id) = deck_id {
            if !self.store.deck_in_workspace(workspace_id, deck_id)? {
                return Err(OracleError::not_found("deck", deck_id));
            }
        }

        let pool = self.store.published_cards(workspace_id, deck_id)?;
        if pool.len() < count {
            return Err(OracleError::DrawInputInvalid {
                reason: format!(
                    "spread '{}' needs {} cards but only {} are published",
                    spread.name,
                    count,
                    pool.len()
                ),
            });
        }

        let cards = sample_unique(&pool, count, seed);
        let positions = self.store.spread_positions(&spread.spread_id)?;
        Ok(Draw {
            spread,
            positions,
            cards,
        })
    }

    /// A reading with its items, ordered by position. Callers without an
    /// elevated role only see readings they created.
    pub fn get_reading(&self, ctx: &TenantContext, reading_id: &str) -> OracleResult<ReadingDetail> {
        let (identity, workspace_id, role) = ctx.require_workspace()?;
        let reading = self
            .store
            .reading_in_workspace(workspace_id, reading_id)?
            .filter(|r| role.is_elevated() || r.created_by_user_id == identity.id)
            .ok_or_else(|| OracleError::not_found("reading", reading_id))?;
        let items = self.store.reading_items(&reading.reading_id)?;
        Ok(ReadingDetail { reading, items })
    }

    /// Newest-first page of readings visible to the caller.
    pub fn history(
        &self,
        ctx: &TenantContext,
        before: Option<&str>,
        limit: u32,
    ) -> OracleResult<HistoryPage> {
        let (identity, workspace_id, role) = ctx.require_workspace()?;
        let created_by = (!role.is_elevated()).then_some(identity.id.as_str());
        let before = non_blank(before).map(HistoryCursor::decode).transpose()?;
        let rows = self.store.readings_page(
            workspace_id,
            created_by,
            before
                .as_ref()
                .map(|c| (c.created_at.as_str(), c.reading_id.as_str())),
            limit.max(1),
        )?;

        let next_cursor = rows.last().map(|r| HistoryCursor::after(r).encode());
        let mut readings = Vec::with_capacity(rows.len());
        for reading in rows {
            let items = self.store.reading_items(&reading.reading_id)?;
            readings.push(ReadingDetail { reading, items });
        }
        Ok(HistoryPage {
            readings,
            next_cursor,
        })
    }

    /// Re-run a stored reading's draw against the current pool.
    /// Matches the stored items as long as the pool is unchanged.
    pub fn replay_draw(&self, ctx: &TenantContext, reading_id: &str) -> OracleResult<Vec<CardRow>> {
        let detail = self.get_reading(ctx, reading_id)?;
        let deck_id = detail
            .reading
            .selected_deck_ids
            .as_ref()
            .and_then(|ids| ids.first())
            .map(String::as_str);
        let pool = self
            .store
            .published_cards(&detail.reading.workspace_id, deck_id)?;
        Ok(sample_unique(
            &pool,
            detail.items.len(),
            &detail.reading.random_seed,
        ))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
