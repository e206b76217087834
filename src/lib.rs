//! Repoconf - configuration resolution for a multi-format artifact server
//!
//! Turns a stored per-repository YAML definition into a validated
//! [`RepoConfig`] on every request, caching the raw configuration text and
//! the visible storage aliases with single-flight loading, TTL expiry and a
//! capacity bound.

pub mod cache;
pub mod config;
pub mod error;
pub mod repo;
pub mod resolver;
pub mod storage;

pub use cache::{CacheKey, CacheStats, LoadingCache, RepositoryName};
pub use config::CacheConfig;
pub use error::{ResolveError, Result};
pub use repo::{proxy_remote, RepoConfig, StorageLocation};
pub use resolver::{AliasSet, ConfigResolver};
pub use storage::{InMemoryStorage, Key, Storage, StorageError};
