//! Resolver Module
//!
//! Turns a repository name into a validated [`RepoConfig`], caching the
//! expensive intermediates (configuration text and alias set) on the way.

pub mod aliases;
pub mod loader;

pub use aliases::{AliasSet, ALIASES_FILE};

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheKey, CacheStats, LoadingCache, RepositoryName};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::repo::RepoConfig;
use crate::storage::{Key, Storage};

// == Config Resolver ==
/// Resolves repository configurations against a single storage backend.
///
/// Owns the cache pair for that backend: one cache for raw configuration
/// text, one for alias sets, both keyed by repository name plus storage
/// identity. Producing the final [`RepoConfig`] from the two cached
/// intermediates is a pure, cheap parse repeated on every call, so cached
/// memory stays bounded to raw text and alias tables.
///
/// Constructed explicitly and injected where needed; several independently
/// tuned resolvers can coexist in one process.
pub struct ConfigResolver {
    storage: Arc<dyn Storage>,
    configs: LoadingCache<String>,
    aliases: LoadingCache<AliasSet>,
}

impl ConfigResolver {
    // == Constructor ==
    /// Creates a resolver over `storage` with the given cache tuning.
    pub fn new(storage: Arc<dyn Storage>, config: &CacheConfig) -> Self {
        Self {
            storage,
            configs: LoadingCache::new(config.ttl(), config.max_entries),
            aliases: LoadingCache::new(config.ttl(), config.max_entries),
        }
    }

    // == Resolve ==
    /// Resolves the validated configuration for the repository `name`.
    ///
    /// Obtains the cached configuration text and alias set concurrently,
    /// waits for both, then parses and validates the combined result. Either
    /// branch failing short-circuits; no partial construction is attempted.
    /// No timeout is imposed here; callers own their wait policy.
    pub async fn resolve(&self, name: &str) -> Result<RepoConfig> {
        let name = RepositoryName::from(name);
        let key = CacheKey::new(name.clone(), self.storage.identity());
        debug!(key = %key, "resolving repository configuration");

        let blob = self.configs.get(&key, {
            let storage = self.storage.clone();
            move |key| async move {
                loader::load_config_text(storage.as_ref(), key.repository()).await
            }
        });
        let aliases = self.aliases.get(&key, {
            let storage = self.storage.clone();
            move |key| async move {
                let scope = Key::from(key.repository().as_str());
                aliases::find(storage.as_ref(), &scope).await
            }
        });
        let (blob, aliases) = tokio::try_join!(blob, aliases)?;

        RepoConfig::parse(&name, &aliases, &blob)
    }

    // == Stats ==
    /// Counters of the configuration-text cache.
    pub fn config_cache_stats(&self) -> CacheStats {
        self.configs.stats()
    }

    /// Counters of the alias-set cache.
    pub fn alias_cache_stats(&self) -> CacheStats {
        self.aliases.stats()
    }

    /// The storage backend this resolver reads from.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}
