use thiserror::Error;

use crate::app::domain::{EntityId, EntityKind};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither the persisted document nor the bootstrap snapshot is usable.
    #[error("Corrupt state: {0}")]
    CorruptState(String),

    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: EntityKind, id: EntityId },

    #[error("Missing navigation parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Unsupported intent: {0}")]
    UnsupportedIntent(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl AppError {
    pub fn not_found(kind: EntityKind, id: &EntityId) -> Self {
        AppError::EntityNotFound {
            kind,
            id: id.clone(),
        }
    }
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
