//! Loading Cache Module
//!
//! Single-flight cache for expensive async loads, with write-time TTL
//! expiry and a capacity bound enforced by LRU eviction.
//!
//! One instance caches configuration text, a second caches alias sets;
//! both are indexed by [`CacheKey`] and polymorphic over the value type.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheStats, LruTracker};
use crate::error::{ResolveError, Result};

/// Outcome of a load, shared between all waiters on the same key.
type LoadOutcome<T> = Result<Arc<T>>;

/// Receiver side of an in-flight load; holds `None` until the load publishes.
type FlightReceiver<T> = watch::Receiver<Option<LoadOutcome<T>>>;

// == Cache Slot ==
/// State of one cache entry.
enum Slot<T> {
    /// A load is running; waiters subscribe to its outcome
    InFlight(FlightReceiver<T>),
    /// A value was written at `written_at` and lives until TTL elapses
    Ready { value: Arc<T>, written_at: Instant },
}

/// Lookup decision taken while the map lock is held.
enum Lookup<T> {
    Hit(Arc<T>),
    Join(FlightReceiver<T>),
    Install,
}

// == Inner State ==
/// Map, access order and counters, guarded by a single mutex.
///
/// The lock is only ever held for map bookkeeping; loads and waits happen
/// outside it, so unrelated keys never serialize behind each other.
struct Inner<T> {
    entries: HashMap<CacheKey, Slot<T>>,
    lru: LruTracker<CacheKey>,
    stats: CacheStats,
}

// == Loading Cache ==
/// Single-flight, TTL- and capacity-bounded async cache.
///
/// Guarantees per key:
/// - At most one loader invocation is in progress at a time; every caller
///   that arrives while it runs awaits the same outcome.
/// - Entries expire `ttl` after the value was written (no sliding expiry).
/// - Failed loads are not retained; the next access retries the loader.
/// - The loader runs on a detached task, so a caller cancelling its own
///   wait never cancels the load other waiters still need.
/// - Values are `Arc`-shared: eviction or expiry never invalidates a value
///   a caller already holds.
pub struct LoadingCache<T> {
    inner: Arc<Mutex<Inner<T>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<T: Send + Sync + 'static> LoadingCache<T> {
    // == Constructor ==
    /// Creates an empty cache with the given entry lifetime and capacity.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                lru: LruTracker::new(),
                stats: CacheStats::new(),
            })),
            ttl,
            max_entries,
        }
    }

    // == Get ==
    /// Returns the cached value for `key`, loading it if necessary.
    ///
    /// A live entry is returned without invoking `loader`. On a miss (or an
    /// expired or evicted entry) the loader is invoked exactly once for all
    /// concurrent callers of the same key; its outcome, success or failure,
    /// is delivered to every waiter.
    pub async fn get<F, Fut>(&self, key: &CacheKey, loader: F) -> LoadOutcome<T>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut rx = {
            let mut inner = self.inner.lock();
            let lookup = match inner.entries.get(key) {
                Some(Slot::Ready { value, written_at }) if written_at.elapsed() < self.ttl => {
                    Lookup::Hit(value.clone())
                }
                Some(Slot::InFlight(rx)) => Lookup::Join(rx.clone()),
                // Vacant, expired or previously evicted
                _ => Lookup::Install,
            };
            match lookup {
                Lookup::Hit(value) => {
                    debug!(key = %key, "cache hit");
                    inner.stats.record_hit();
                    inner.lru.touch(key);
                    return Ok(value);
                }
                Lookup::Join(rx) => {
                    debug!(key = %key, "joining in-flight load");
                    inner.stats.record_hit();
                    rx
                }
                Lookup::Install => {
                    inner.stats.record_miss();
                    self.install_flight(&mut inner, key.clone(), loader)
                }
            }
        };

        // Bound so the `Ref` borrowing `rx` is dropped before `rx` is
        let published = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };
        match published {
            Some(outcome) => outcome,
            None => {
                // The load task died without publishing. Remove its dead
                // slot, if still installed, so the next access starts a
                // fresh flight instead of joining this one forever.
                warn!(key = %key, "load task dropped without publishing");
                let mut inner = self.inner.lock();
                let dead = matches!(
                    inner.entries.get(key),
                    Some(Slot::InFlight(current)) if current.same_channel(&rx)
                );
                if dead {
                    inner.entries.remove(key);
                    inner.lru.remove(key);
                    let total = inner.entries.len();
                    inner.stats.set_total_entries(total);
                }
                Err(ResolveError::Storage(format!(
                    "load for `{key}` was interrupted"
                )))
            }
        }
    }

    // == Install Flight ==
    /// Registers an in-flight slot for `key` and spawns the load.
    ///
    /// The load task publishes into the map first and only then notifies
    /// waiters, so a waiter woken by the outcome never observes a stale slot.
    fn install_flight<F, Fut>(
        &self,
        inner: &mut Inner<T>,
        key: CacheKey,
        loader: F,
    ) -> FlightReceiver<T>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        debug!(key = %key, "cache miss, starting load");
        let (tx, rx) = watch::channel(None);
        inner.entries.insert(key.clone(), Slot::InFlight(rx.clone()));
        inner.lru.touch(&key);
        inner.stats.set_total_entries(inner.entries.len());

        let cache = Arc::downgrade(&self.inner);
        let max_entries = self.max_entries;
        let load = loader(key.clone());
        tokio::spawn(async move {
            let outcome: LoadOutcome<T> = load.await.map(Arc::new);
            if let Some(cache) = cache.upgrade() {
                publish(&mut cache.lock(), &key, &outcome, max_entries);
            }
            // Deliver to waiters even if the cache itself is already gone
            let _ = tx.send(Some(outcome));
        });
        rx
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries (ready and in-flight).
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

// == Publish ==
/// Writes a finished load back into the map.
///
/// Successes become `Ready` entries timestamped at completion; failures are
/// removed so the next access retries the loader from scratch.
fn publish<T>(inner: &mut Inner<T>, key: &CacheKey, outcome: &LoadOutcome<T>, max_entries: usize) {
    match outcome {
        Ok(value) => {
            inner.entries.insert(
                key.clone(),
                Slot::Ready {
                    value: value.clone(),
                    written_at: Instant::now(),
                },
            );
            inner.lru.touch(key);
            evict_over_capacity(inner, max_entries);
        }
        Err(err) => {
            warn!(key = %key, error = %err, "load failed, entry dropped");
            inner.entries.remove(key);
            inner.lru.remove(key);
        }
    }
    inner.stats.set_total_entries(inner.entries.len());
}

// == Evict Over Capacity ==
/// Discards the least recently used ready entries until the cache fits.
///
/// In-flight slots are skipped: a load that callers are waiting on must
/// never be discarded from under them.
fn evict_over_capacity<T>(inner: &mut Inner<T>, max_entries: usize) {
    while inner.entries.len() > max_entries {
        let victim = inner
            .lru
            .iter_oldest_first()
            .find(|k| matches!(inner.entries.get(*k), Some(Slot::Ready { .. })))
            .cloned();
        match victim {
            Some(key) => {
                debug!(key = %key, "evicting over capacity");
                inner.entries.remove(&key);
                inner.lru.remove(&key);
                inner.stats.record_eviction();
            }
            None => break,
        }
    }
}
