use activity_events::EventError;
use thiserror::Error;

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors raised while talking to the events API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Repository(#[from] EventError),

    #[error("Configuration error: {0}")]
    Config(String),
}
