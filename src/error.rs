//! Error types for configuration resolution
//!
//! Provides the typed failure taxonomy surfaced by the resolver, using thiserror.

use thiserror::Error;

use crate::storage::StorageError;

// == Resolve Error Enum ==
/// Unified error type for repository configuration resolution.
///
/// The variants distinguish "repository unknown" (`NotFound`) from
/// "repository misconfigured" (`Parse`/`Validation`) from "transient
/// infrastructure failure" (`Storage`), so callers can map them to
/// different HTTP statuses or retry decisions.
///
/// The type is `Clone` because a single load outcome is shared between
/// every concurrent waiter on the same cache key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No configuration resource exists for the repository
    #[error("repository not found: {0}")]
    NotFound(String),

    /// I/O failure reading from the backing storage
    #[error("storage failure: {0}")]
    Storage(String),

    /// Malformed configuration text or unresolvable alias reference
    #[error("malformed repository configuration: {0}")]
    Parse(String),

    /// Structurally valid configuration violating a consumer rule
    #[error("invalid repository configuration: {0}")]
    Validation(String),
}

impl ResolveError {
    /// Builds a `Parse` error from any displayable cause.
    pub fn parse(msg: impl Into<String>) -> Self {
        ResolveError::Parse(msg.into())
    }

    /// Builds a `Validation` error from any displayable cause.
    pub fn validation(msg: impl Into<String>) -> Self {
        ResolveError::Validation(msg.into())
    }
}

// == Storage Error Conversion ==
impl From<StorageError> for ResolveError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => ResolveError::NotFound(key.to_string()),
            StorageError::Backend(msg) => ResolveError::Storage(msg),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for configuration resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;
