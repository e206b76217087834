//! Storage Module
//!
//! Boundary to the content-addressable storage backend. The resolver only
//! reads from storage; drivers themselves live outside this crate.

mod key;
mod memory;

pub use key::Key;
pub use memory::InMemoryStorage;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

// == Storage Error Enum ==
/// Failures surfaced by a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No value exists for the requested key
    #[error("no value for key `{0}`")]
    NotFound(Key),

    /// Backend I/O failure
    #[error("storage backend failure: {0}")]
    Backend(String),
}

// == Storage Trait ==
/// Async content-addressable key-value store.
///
/// Implementations must be safe for concurrent access; the resolver issues
/// overlapping reads from many tasks without external locking.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stable identifier of this storage instance.
    ///
    /// Cache keys incorporate this value, so it must stay constant for the
    /// lifetime of the instance and differ between instances that may hold
    /// different content. A configured name is the expected source.
    fn identity(&self) -> &str;

    /// Reads the value stored under `key`.
    async fn get(&self, key: &Key) -> Result<Bytes, StorageError>;

    /// Checks whether a value exists under `key` without reading it.
    async fn exists(&self, key: &Key) -> Result<bool, StorageError>;
}
