//! Error types for Tether.

use crate::state::WorkerState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Cache errors
    #[error("Cache storage error: {0}")]
    CacheStorage(String),

    #[error("Invalid cache name: {0}")]
    InvalidCacheName(String),

    // Lifecycle errors
    #[error("Precache failed for {url}: {reason}")]
    PrecacheFailed { url: String, reason: String },

    #[error("Invalid worker state: expected {expected}, got {actual}")]
    InvalidState {
        expected: String,
        actual: WorkerState,
    },

    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // Infrastructure errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Whether the error came from the network rather than the local store.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}
