//! Error types for flock.

use thiserror::Error;

/// Common error type for flock.
#[derive(Error, Debug)]
pub enum FlockError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound HTTP error.
    ///
    /// Covers transport failures, non-2xx statuses and oversized bodies.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Payload could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Cache payload could not be encoded or decoded.
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for caller input.
    #[error("{0}")]
    Validation(String),

    /// A playlist could not be built from the given records.
    #[error("playlist error: {0}")]
    Playlist(String),
}

impl From<serde_json::Error> for FlockError {
    fn from(e: serde_json::Error) -> Self {
        FlockError::Parse(e.to_string())
    }
}

/// Result type alias for flock operations.
pub type Result<T> = std::result::Result<T, FlockError>;
