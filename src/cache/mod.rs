//! Cache Module
//!
//! Single-flight caching of configuration-resolution intermediates, with
//! TTL expiry and LRU capacity eviction.

mod key;
mod loading;
mod lru;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use key::{CacheKey, RepositoryName};
pub use loading::LoadingCache;
pub use lru::LruTracker;
pub use stats::CacheStats;
