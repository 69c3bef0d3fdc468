//! Resolver error types.

use thiserror::Error;

/// Errors surfaced by name resolution.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The name is a hash prefix matching more than one artifact.
    #[error("ambiguous name: {name}")]
    AmbiguousName {
        /// The name as given by the caller.
        name: String,
        /// How many artifacts matched.
        count: usize,
    },

    /// No artifact answers to the name under the requested filter.
    #[error("not found: {name}")]
    NotFound {
        /// The name as given by the caller.
        name: String,
    },

    /// The query itself is unusable, before any lookup was attempted.
    #[error("malformed query: {reason}")]
    MalformedQuery {
        /// What made the query unusable.
        reason: String,
    },

    /// The underlying index failed.
    #[error("index error: {0}")]
    Index(#[from] quarry_core::Error),
}

impl ResolverError {
    /// Create an ambiguous-name error.
    pub fn ambiguous_name(name: impl Into<String>, count: usize) -> Self {
        ResolverError::AmbiguousName {
            name: name.into(),
            count,
        }
    }

    /// Create a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        ResolverError::NotFound { name: name.into() }
    }

    /// Create a malformed-query error.
    pub fn malformed_query(reason: impl Into<String>) -> Self {
        ResolverError::MalformedQuery {
            reason: reason.into(),
        }
    }
}

/// Result alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;
