//! Error types for the undo/redo engine.

use thiserror::Error;

/// Main error type for engine operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to clone state: {0}")]
    CloneFailure(String),

    #[error("Host store read failed: {0}")]
    HostRead(String),

    #[error("Host store rejected commit: {0}")]
    HostCommit(String),

    #[error("Invalid option `{field}`: {reason}")]
    InvalidOption { field: String, reason: String },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Engine has been destroyed")]
    Destroyed,
}

impl HistoryError {
    pub(crate) fn invalid_option(field: &str, reason: impl Into<String>) -> Self {
        HistoryError::InvalidOption {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(e: serde_json::Error) -> Self {
        HistoryError::InvalidOptions(e.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
