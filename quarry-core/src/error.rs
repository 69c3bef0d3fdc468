//! Error types for quarry-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// The artifact index could not serve a query
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// String is not a valid hash name or hash prefix
    #[error("Invalid hash name: {0}")]
    InvalidHashName(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an index unavailable error
    pub fn index_unavailable(msg: impl Into<String>) -> Self {
        Error::IndexUnavailable(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create an invalid hash name error
    pub fn invalid_hash_name(msg: impl Into<String>) -> Self {
        Error::InvalidHashName(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
