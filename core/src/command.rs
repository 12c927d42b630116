use serde::{Deserialize, Serialize};
use crate::{reading::CreateReadingRequest, types::EntityId};

/// Every request a client can send over the command surface.
/// Each variant runs under one fixed route scope, see [`ClientCommand::scope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    // ── Readings ──────────────────────────────────
    CreateReading(CreateReadingRequest),
    GetReading {
        #[serde(rename = "readingId")]
        reading_id: EntityId,
    },
    History {
        #[serde(default)]
        before: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },

    // ── Persons ───────────────────────────────────
    CreatePerson {
        name: String,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    ListPersons,
    ArchivePerson {
        #[serde(rename = "personId")]
        person_id: EntityId,
    },

    // ── Join ──────────────────────────────────────
    RedeemAccessCode { code: String },

    // ── Master area ───────────────────────────────
    ListAllowedEmails,
    AddAllowedEmail { email: String },
    SetAllowedEmailEnabled {
        #[serde(rename = "allowedEmailId")]
        allowed_email_id: EntityId,
        enabled: bool,
    },
    DeleteAllowedEmail {
        #[serde(rename = "allowedEmailId")]
        allowed_email_id: EntityId,
    },

    Quit,
}

impl ClientCommand {
    pub fn scope(&self) -> crate::tenancy::RouteScope {
        use crate::tenancy::RouteScope;
        match self {
            Self::RedeemAccessCode { .. } => RouteScope::Join,
            Self::ListAllowedEmails
            | Self::AddAllowedEmail { .. }
            | Self::SetAllowedEmailEnabled { .. }
            | Self::DeleteAllowedEmail { .. } => RouteScope::Master,
            Self::Quit => RouteScope::Anonymous,
            _ => RouteScope::Tenant,
        }
    }
}
