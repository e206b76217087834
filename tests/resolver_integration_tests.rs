//! Integration Tests for Configuration Resolution
//!
//! Exercises the full resolve path against an instrumented storage backend:
//! caching, single-flight loading, TTL expiry, failure handling and the
//! proxy-remote consumer rule.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::advance;

use repoconf::{
    proxy_remote, CacheConfig, ConfigResolver, InMemoryStorage, Key, ResolveError, Storage,
    StorageError,
};

// == Instrumented Storage ==

/// Storage wrapper counting every read issued by the resolver.
struct CountingStorage {
    inner: InMemoryStorage,
    reads: AtomicUsize,
}

impl CountingStorage {
    fn new(inner: InMemoryStorage) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for CountingStorage {
    fn identity(&self) -> &str {
        self.inner.identity()
    }

    async fn get(&self, key: &Key) -> Result<Bytes, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn exists(&self, key: &Key) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }
}

/// Storage wrapper failing the first `failures` reads with a backend error.
struct FlakyStorage {
    inner: InMemoryStorage,
    remaining_failures: AtomicUsize,
}

impl FlakyStorage {
    fn new(inner: InMemoryStorage, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    fn identity(&self) -> &str {
        self.inner.identity()
    }

    async fn get(&self, key: &Key) -> Result<Bytes, StorageError> {
        if self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StorageError::Backend("injected i/o failure".to_string()));
        }
        self.inner.get(key).await
    }

    async fn exists(&self, key: &Key) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }
}

// == Fixtures ==

const MAVEN_CONFIG: &str = "\
repo:
  type: maven
  storage: default
";

const ALIASES: &str = "\
storages:
  default:
    type: fs
    path: /var/artifacts
  proxy-cache:
    type: fs
    path: /var/cache
";

fn seeded_storage() -> InMemoryStorage {
    let storage = InMemoryStorage::new("primary");
    storage.put(Key::from("maven-central.yaml"), MAVEN_CONFIG);
    storage.put(Key::from("npm.yaml"), "repo:\n  type: npm\n  storage: default\n");
    storage.put(Key::from("_storages.yaml"), ALIASES);
    storage
}

fn resolver_over(storage: Arc<dyn Storage>) -> ConfigResolver {
    let config = CacheConfig {
        ttl_ms: 120_000,
        max_entries: 100,
    };
    ConfigResolver::new(storage, &config)
}

// == Caching Scenarios ==

#[tokio::test(start_paused = true)]
async fn test_second_resolve_within_ttl_reads_nothing() {
    let storage = Arc::new(CountingStorage::new(seeded_storage()));
    let resolver = resolver_over(storage.clone());

    let config = resolver.resolve("maven-central").await.unwrap();
    assert_eq!(config.repo_type(), "maven");
    assert_eq!(config.storage().unwrap().path, "/var/artifacts");
    // One read for the blob, one for the aliases file
    assert_eq!(storage.reads(), 2);

    advance(Duration::from_secs(1)).await;
    let again = resolver.resolve("maven-central").await.unwrap();
    assert_eq!(again, config);
    assert_eq!(storage.reads(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_resolve_after_ttl_reloads() {
    let storage = Arc::new(CountingStorage::new(seeded_storage()));
    let resolver = resolver_over(storage.clone());

    resolver.resolve("maven-central").await.unwrap();
    assert_eq!(storage.reads(), 2);

    // Content is byte-identical, the reload must still hit storage
    advance(Duration::from_millis(120_000)).await;
    resolver.resolve("maven-central").await.unwrap();
    assert_eq!(storage.reads(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_simultaneous_resolves_share_one_load() {
    let storage = Arc::new(CountingStorage::new(seeded_storage()));
    let resolver = Arc::new(resolver_over(storage.clone()));

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let resolver = resolver.clone();
        tasks.push(tokio::spawn(async move { resolver.resolve("npm").await }));
    }
    for task in tasks {
        let config = task.await.unwrap().unwrap();
        assert_eq!(config.repo_type(), "npm");
    }

    // Exactly one blob read and one alias read despite four callers
    assert_eq!(storage.reads(), 2);
    assert_eq!(resolver.config_cache_stats().misses, 1);
    assert_eq!(resolver.alias_cache_stats().misses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_repository_names_cache_independently() {
    let storage = Arc::new(CountingStorage::new(seeded_storage()));
    let resolver = resolver_over(storage.clone());

    resolver.resolve("maven-central").await.unwrap();
    let after_first = storage.reads();

    resolver.resolve("npm").await.unwrap();
    assert!(storage.reads() > after_first);

    // Resolving "npm" must not have evicted "maven-central"
    let after_second = storage.reads();
    resolver.resolve("maven-central").await.unwrap();
    assert_eq!(storage.reads(), after_second);
}

// == Failure Scenarios ==

#[tokio::test]
async fn test_unknown_repository_is_not_found() {
    let resolver = resolver_over(Arc::new(seeded_storage()));

    let err = resolver.resolve("missing").await.unwrap_err();
    assert_eq!(err, ResolveError::NotFound("missing".to_string()));
}

#[tokio::test]
async fn test_storage_failure_is_not_cached() {
    let storage = InMemoryStorage::new("primary");
    storage.put(Key::from("maven-central.yaml"), MAVEN_CONFIG);
    storage.put(Key::from("_storages.yaml"), ALIASES);
    // Enough injected failures to break both branches of the first resolve
    let storage = Arc::new(FlakyStorage::new(storage, 2));
    let resolver = resolver_over(storage.clone());

    let err = resolver.resolve("maven-central").await.unwrap_err();
    assert!(matches!(err, ResolveError::Storage(_)));

    // Let the detached loads of the failed resolve settle before retrying
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    // The failure was evicted, not retained: the retry loads from scratch
    let config = resolver.resolve("maven-central").await.unwrap();
    assert_eq!(config.repo_type(), "maven");
}

#[tokio::test]
async fn test_malformed_configuration_is_parse_error() {
    let storage = InMemoryStorage::new("primary");
    storage.put(Key::from("broken.yaml"), "repo: [this is not a mapping");
    let resolver = resolver_over(Arc::new(storage));

    let err = resolver.resolve("broken").await.unwrap_err();
    assert!(matches!(err, ResolveError::Parse(_)));
}

#[tokio::test]
async fn test_unresolvable_alias_is_parse_error() {
    let storage = InMemoryStorage::new("primary");
    storage.put(
        Key::from("maven.yaml"),
        "repo:\n  type: maven\n  storage: no-such-alias\n",
    );
    let resolver = resolver_over(Arc::new(storage));

    let err = resolver.resolve("maven").await.unwrap_err();
    assert_eq!(
        err,
        ResolveError::Parse("unknown storage alias `no-such-alias`".to_string())
    );
}

#[tokio::test]
async fn test_missing_aliases_file_resolves_with_empty_set() {
    let storage = InMemoryStorage::new("primary");
    storage.put(Key::from("maven.yaml"), "repo:\n  type: maven\n");
    let resolver = resolver_over(Arc::new(storage));

    let config = resolver.resolve("maven").await.unwrap();
    assert_eq!(config.repo_type(), "maven");
}

// == Proxy Validation Scenarios ==
// The rule consumes a resolved RepoConfig, so it can only ever run after
// resolve() has succeeded.

#[tokio::test]
async fn test_proxy_remote_with_cache_is_accepted() {
    let storage = seeded_storage();
    storage.put(
        Key::from("pypi.yaml"),
        "\
repo:
  type: pypi
  remotes:
    - url: https://pypi.org/simple
      cache:
        storage: proxy-cache
",
    );
    let resolver = resolver_over(Arc::new(storage));

    let config = resolver.resolve("pypi").await.unwrap();
    let remote = proxy_remote(&config).unwrap();
    assert_eq!(remote.url(), "https://pypi.org/simple");
    assert_eq!(remote.cache().unwrap().path, "/var/cache");
}

#[tokio::test]
async fn test_two_proxy_remotes_fail_validation() {
    let storage = seeded_storage();
    storage.put(
        Key::from("pypi.yaml"),
        "\
repo:
  type: pypi
  remotes:
    - url: https://pypi.org/simple
      cache:
        storage: proxy-cache
    - url: https://mirror.example/simple
      cache:
        storage: proxy-cache
",
    );
    let resolver = resolver_over(Arc::new(storage));

    let config = resolver.resolve("pypi").await.unwrap();
    let err = proxy_remote(&config).unwrap_err();
    assert_eq!(
        err,
        ResolveError::Validation("only one remote is allowed".to_string())
    );
}

#[tokio::test]
async fn test_proxy_remote_without_cache_fails_validation() {
    let storage = seeded_storage();
    storage.put(
        Key::from("pypi.yaml"),
        "\
repo:
  type: pypi
  remotes:
    - url: https://pypi.org/simple
",
    );
    let resolver = resolver_over(Arc::new(storage));

    let config = resolver.resolve("pypi").await.unwrap();
    let err = proxy_remote(&config).unwrap_err();
    assert_eq!(
        err,
        ResolveError::Validation("proxy requires cache storage".to_string())
    );
}

#[tokio::test]
async fn test_no_remotes_fails_validation() {
    let resolver = resolver_over(Arc::new(seeded_storage()));

    let config = resolver.resolve("maven-central").await.unwrap();
    let err = proxy_remote(&config).unwrap_err();
    assert_eq!(
        err,
        ResolveError::Validation("no remotes specified".to_string())
    );
}

// == Storage Identity ==

#[tokio::test]
async fn test_resolvers_over_different_storages_do_not_share_entries() {
    let primary = Arc::new(CountingStorage::new(seeded_storage()));
    let replica = {
        let storage = InMemoryStorage::new("replica");
        storage.put(Key::from("maven-central.yaml"), "repo:\n  type: maven\n");
        Arc::new(CountingStorage::new(storage))
    };

    let resolver_a = resolver_over(primary.clone());
    let resolver_b = resolver_over(replica.clone());

    resolver_a.resolve("maven-central").await.unwrap();
    resolver_b.resolve("maven-central").await.unwrap();

    // Each resolver loaded from its own backend
    assert!(primary.reads() > 0);
    assert!(replica.reads() > 0);
}
