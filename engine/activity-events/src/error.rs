//! Error types for activity events

use thiserror::Error;

/// Result type alias for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Errors raised while validating repositories or decoding event records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Repository identifier is not in `owner/repo` form
    #[error("invalid format: {0}. Use 'owner/repo'.")]
    InvalidRepository(String),

    /// `created_at` could not be parsed
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A stored or fetched record is missing required fields
    #[error("malformed event record: {0}")]
    MalformedRecord(String),
}

impl EventError {
    /// Create a new invalid repository error
    pub fn invalid_repository(repo: impl Into<String>) -> Self {
        Self::InvalidRepository(repo.into())
    }

    /// Create a new malformed record error
    pub fn malformed_record(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }
}
