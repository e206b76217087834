//! Configuration Module
//!
//! Handles loading cache tuning parameters from environment variables.

use std::env;
use std::time::Duration;

/// Default entry lifetime in milliseconds (2 minutes).
pub const DEFAULT_TTL_MS: u64 = 120_000;

/// Default maximum number of entries per cache.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Cache tuning parameters.
///
/// Read once at process startup and injected into [`crate::ConfigResolver`];
/// there is no hidden global state, so tests and embedders can run several
/// independently tuned resolvers in one process.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entry lifetime in milliseconds, measured from the moment a value is written
    pub ttl_ms: u64,
    /// Maximum number of entries each cache can hold before LRU eviction
    pub max_entries: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CONFIG_CACHE_TTL_MS` - Entry lifetime in milliseconds (default: 120000)
    /// - `CONFIG_CACHE_MAX_ENTRIES` - Maximum entries per cache (default: 1000)
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            ttl_ms: env::var("CONFIG_CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_MS),
            max_entries: env::var("CONFIG_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES),
        }
    }

    /// Entry lifetime as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}
