//! Cache Key Module
//!
//! Identifies cached configuration intermediates by repository name and
//! storage instance.

use std::fmt;

// == Repository Name ==
/// Opaque name of a repository served by the artifact server.
///
/// Maps 1:1 to a resource path in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// The raw name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RepositoryName {
    fn from(name: &str) -> Self {
        RepositoryName(name.to_string())
    }
}

impl From<String> for RepositoryName {
    fn from(name: String) -> Self {
        RepositoryName(name)
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Cache Key ==
/// Composite cache index: repository name plus storage-instance identity.
///
/// Equality is defined over the name value and the stable identity string of
/// the storage instance ([`crate::storage::Storage::identity`]), never over
/// storage contents or object addresses. Two resolvers over storages with
/// different identities never share cache entries, even for the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    repo: RepositoryName,
    storage: String,
}

impl CacheKey {
    /// Creates a key for `repo` scoped to the storage named `storage_id`.
    pub fn new(repo: RepositoryName, storage_id: impl Into<String>) -> Self {
        Self {
            repo,
            storage: storage_id.into(),
        }
    }

    /// The repository name component.
    pub fn repository(&self) -> &RepositoryName {
        &self.repo
    }

    /// The storage identity component.
    pub fn storage_id(&self) -> &str {
        &self.storage
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.storage, self.repo)
    }
}
