//! Error handling for the metals feed.

use thiserror::Error;

/// Main error type for the metals feed
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Data-related errors (e.g. malformed JSON or a non-numeric price)
    #[error("Data error: {0}")]
    DataError(String),

    /// Connection / network errors, including non-2xx responses
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Time-series store errors
    #[error("Store error: {0}")]
    StoreError(String),

    /// HTTP client construction errors
    #[error("Request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

/// Result type for the metals feed
pub type Result<T> = std::result::Result<T, Error>;
