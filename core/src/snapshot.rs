//! Reading item snapshots: card and position display data frozen at draw time.
//!
//! A snapshot is written once, with the reading, and never re-derived from
//! the live catalog. Editing or deleting a card later must not change how
//! an existing reading renders.

use crate::store::{CardRow, SpreadPositionRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub position: PositionSnapshot,
    pub card: CardSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub id: String,
    pub name: String,
    pub image_path: Option<String>,
    pub short_message: String,
    pub meaning: String,
    pub meaning_extended: Option<String>,
}

impl ItemSnapshot {
    /// Freeze `card` at 1-based `position_index`. Spreads without a
    /// position row for that index get a generic title.
    pub fn capture(
        position_index: i64,
        position: Option<&SpreadPositionRow>,
        card: &CardRow,
    ) -> Self {
        let position = match position {
            Some(p) => PositionSnapshot {
                title: p.title.clone(),
                description: p.description.clone(),
            },
            None => PositionSnapshot {
                title: format!("Position {position_index}"),
                description: None,
            },
        };
        Self {
            position,
            card: CardSnapshot {
                id: card.card_id.clone(),
                name: card.name.clone(),
                image_path: card.image_path.clone(),
                short_message: card.short_message.clone(),
                meaning: card.meaning.clone(),
                meaning_extended: card.meaning_extended.clone(),
            },
        }
    }
}
