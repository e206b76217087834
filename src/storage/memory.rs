//! In-Memory Storage Module
//!
//! HashMap-backed storage implementation for tests and embedded setups.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::storage::{Key, Storage, StorageError};

// == In-Memory Storage ==
/// Thread-safe in-memory storage backend.
///
/// Reads never fail with [`StorageError::Backend`]; use a wrapping
/// implementation to inject I/O failures in tests.
#[derive(Debug)]
pub struct InMemoryStorage {
    /// Configured instance name, used as cache-key identity
    name: String,
    /// Stored values
    data: RwLock<HashMap<Key, Bytes>>,
}

impl InMemoryStorage {
    /// Creates an empty storage with the given instance name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&self, key: Key, value: impl Into<Bytes>) {
        self.data.write().insert(key, value.into());
    }

    /// Removes the value under `key`, if any.
    pub fn delete(&self, key: &Key) {
        self.data.write().remove(key);
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    fn identity(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &Key) -> Result<Bytes, StorageError> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.clone()))
    }

    async fn exists(&self, key: &Key) -> Result<bool, StorageError> {
        Ok(self.data.read().contains_key(key))
    }
}
