//! Error types for layout persistence
use thiserror::Error;

/// Layout store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport failure (connection refused, timeout, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-2xx status
    #[error("Server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The configured base URL is unusable
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Reference backend failure
    #[error("HTTP server error: {0}")]
    Server(String),
}

impl StoreError {
    /// HTTP status code, if the service answered
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { status, .. } => Some(*status),
            StoreError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
