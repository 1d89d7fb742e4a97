use crate::types::UserId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed roster: {reason}")]
    DataFormat { reason: String },

    #[error("Unknown role tag '{tag}'")]
    UnknownRole { tag: String },

    #[error("Role '{role}' has no eligible entries")]
    EmptyRole { role: String },

    #[error("Chaos team needs {needed} distinct entries, roster has {available}")]
    InsufficientRoster { needed: usize, available: usize },

    #[error("User {user_id} left timeout while not in timeout")]
    InconsistentState { user_id: UserId },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type BotResult<T> = Result<T, BotError>;
