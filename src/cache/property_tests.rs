//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify ordering and identity properties of the LRU
//! tracker and cache keys under arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::{CacheKey, LruTracker};
use crate::storage::Key;

// == Strategies ==
/// Generates repository-name-shaped keys
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,16}"
}

/// Generates a sequence of tracker operations
#[derive(Debug, Clone)]
enum LruOp {
    Touch(String),
    Remove(String),
}

fn lru_op_strategy() -> impl Strategy<Value = LruOp> {
    prop_oneof![
        name_strategy().prop_map(LruOp::Touch),
        name_strategy().prop_map(LruOp::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any operation sequence the tracker never holds duplicates, and its
    // length equals the number of distinct touched-and-not-removed keys.
    #[test]
    fn prop_lru_tracks_distinct_live_keys(ops in prop::collection::vec(lru_op_strategy(), 1..50)) {
        let mut lru: LruTracker<String> = LruTracker::new();
        let mut live: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                LruOp::Touch(key) => {
                    lru.touch(&key);
                    live.insert(key);
                }
                LruOp::Remove(key) => {
                    lru.remove(&key);
                    live.remove(&key);
                }
            }
        }

        prop_assert_eq!(lru.len(), live.len(), "Tracker length mismatch");
        let seen: HashSet<&String> = lru.iter_oldest_first().collect();
        prop_assert_eq!(seen.len(), lru.len(), "Tracker holds duplicates");
    }

    // A touched key is always the most recently used one.
    #[test]
    fn prop_lru_touch_moves_to_most_recent(
        ops in prop::collection::vec(lru_op_strategy(), 0..30),
        last in name_strategy()
    ) {
        let mut lru: LruTracker<String> = LruTracker::new();
        for op in ops {
            match op {
                LruOp::Touch(key) => lru.touch(&key),
                LruOp::Remove(key) => lru.remove(&key),
            }
        }

        lru.touch(&last);
        let most_recent = lru.iter_oldest_first().last();
        prop_assert_eq!(most_recent, Some(&last), "Touched key is not most recent");
    }

    // The oldest key is the first eviction candidate reported.
    #[test]
    fn prop_lru_peek_matches_iteration(keys in prop::collection::vec(name_strategy(), 1..20)) {
        let mut lru: LruTracker<String> = LruTracker::new();
        for key in &keys {
            lru.touch(key);
        }

        prop_assert_eq!(lru.peek_oldest(), lru.iter_oldest_first().next());
    }

    // Cache keys are equal exactly when both the repository name and the
    // storage identity are equal.
    #[test]
    fn prop_cache_key_identity(
        name_a in name_strategy(), storage_a in name_strategy(),
        name_b in name_strategy(), storage_b in name_strategy()
    ) {
        let a = CacheKey::new(name_a.as_str().into(), storage_a.as_str());
        let b = CacheKey::new(name_b.as_str().into(), storage_b.as_str());

        prop_assert_eq!(a == b, name_a == name_b && storage_a == storage_b);
    }

    // Storage key normalization: separators collapse, parent/join round-trip.
    #[test]
    fn prop_storage_key_join_parent_roundtrip(
        scope in name_strategy(), leaf in name_strategy()
    ) {
        let key = Key::from(scope.as_str()).join(&leaf);
        prop_assert_eq!(key.parent(), Some(Key::from(scope.as_str())));
        prop_assert_eq!(key.as_str(), format!("{scope}/{leaf}"));
    }
}
