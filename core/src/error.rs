use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("No active workspace")]
    NoTenant,

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Provisioning failed: {reason}")]
    ProvisioningFailure { reason: String },

    #[error("Invalid draw input: {reason}")]
    DrawInputInvalid { reason: String },

    #[error("Could not create reading: {reason}")]
    PersistenceFailure { reason: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OracleError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden { reason: reason.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    /// HTTP-style status class reported to callers.
    pub fn status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::NoTenant | Self::DrawInputInvalid { .. } | Self::InvalidInput { .. } => 400,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::ProvisioningFailure { .. }
            | Self::PersistenceFailure { .. }
            | Self::Database(_)
            | Self::Serialization(_)
            | Self::Other(_) => 500,
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            message: self.to_string(),
            status: self.status(),
        }
    }
}

/// Error body returned on the command surface.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub message: String,
    pub status: u16,
}

pub type OracleResult<T> = Result<T, OracleError>;
