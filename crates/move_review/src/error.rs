//! Error types for the review pipeline

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures that end a pipeline run.
///
/// Per-game problems (unreadable move text, engine crashes) never show up
/// here; they are folded into the game's outcome instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Store unreachable, schema mismatch or a failed commit
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row that cannot be turned back into the data model
    #[error("Invalid row in {table}: {reason}")]
    InvalidRow { table: String, reason: String },

    #[error("Game not found: {0}")]
    GameNotFound(String),
}
