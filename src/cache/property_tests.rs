//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's byte budget and recency order, and the
//! hash ring's placement guarantees.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::{ByteView, LruCache};
use crate::consistenthash::HashRing;

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}".prop_map(|s| s)
}

/// Generates cache values, empty ones included
fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Generates a sequence of store operations
#[derive(Debug, Clone)]
enum StoreOp {
    Add { key: String, value: Vec<u8> },
    Get { key: String },
    RemoveOldest,
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| StoreOp::Add { key, value }),
        2 => key_strategy().prop_map(|key| StoreOp::Get { key }),
        1 => Just(StoreOp::RemoveOldest),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // *For any* sequence of operations on a bounded store, consumed bytes
    // never exceed the budget and always equal the sum of key + value lengths
    // of the entries still held.
    #[test]
    fn prop_budget_never_exceeded(
        max_bytes in 1u64..256,
        ops in prop::collection::vec(store_op_strategy(), 1..100)
    ) {
        let mut lru = LruCache::new(max_bytes);
        let mut live: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                StoreOp::Add { key, value } => {
                    live.insert(key.clone());
                    lru.add(key, ByteView::from(value));
                }
                StoreOp::Get { key } => {
                    let _ = lru.get(&key);
                }
                StoreOp::RemoveOldest => lru.remove_oldest(),
            }
            prop_assert!(lru.used_bytes() <= max_bytes, "budget exceeded");
        }

        let held: Vec<String> = live.into_iter().filter(|k| lru.contains(k)).collect();
        prop_assert_eq!(held.len(), lru.len(), "index and recency list disagree");
        let expected: u64 = held
            .iter()
            .map(|k| (k.len() + lru.get(k).map(ByteView::len).unwrap_or(0)) as u64)
            .sum();
        prop_assert_eq!(lru.used_bytes(), expected, "byte counter drifted");
    }

    // *For any* N fixed-size entries filling the budget exactly, adding one
    // more evicts exactly the least recently touched entry, and touching an
    // entry first protects it.
    #[test]
    fn prop_lru_evicts_least_recent(
        n in 2usize..20,
        touched in any::<prop::sample::Index>()
    ) {
        // Keys k00..kNN, values of 4 bytes: every entry is 7 bytes
        let key = |i: usize| format!("k{i:02}");
        let mut lru = LruCache::new((n * 7) as u64);
        for i in 0..n {
            lru.add(key(i), ByteView::from("vvvv"));
        }
        prop_assert_eq!(lru.len(), n);

        let touched = touched.index(n);
        prop_assert!(lru.get(&key(touched)).is_some());

        lru.add(key(n), ByteView::from("vvvv"));

        let expected_victim = if touched == 0 { 1 } else { 0 };
        prop_assert_eq!(lru.len(), n);
        prop_assert!(!lru.contains(&key(expected_victim)));
        prop_assert!(lru.contains(&key(touched)));
        prop_assert!(lru.contains(&key(n)));
    }

    // *For any* non-empty ring, lookups are deterministic and always return
    // one of the nodes that was added.
    #[test]
    fn prop_ring_deterministic_and_non_empty(
        nodes in prop::collection::hash_set(key_strategy(), 1..8),
        replicas in 1usize..60,
        keys in prop::collection::vec(key_strategy(), 1..50)
    ) {
        let mut ring = HashRing::new(replicas, None);
        ring.add(&nodes);
        prop_assert_eq!(ring.len(), nodes.len() * replicas);

        for key in keys {
            let first = ring.get(&key);
            prop_assert_eq!(first, ring.get(&key));
            let owner = first.expect("non-empty ring");
            prop_assert!(nodes.contains(owner));
        }
    }

    // *For any* ring, adding nodes only moves keys onto the new nodes.
    #[test]
    fn prop_ring_add_moves_keys_to_new_nodes_only(
        nodes in prop::collection::hash_set(key_strategy(), 1..6),
        extra in prop::collection::hash_set(key_strategy(), 1..4),
        keys in prop::collection::vec(key_strategy(), 1..50)
    ) {
        let mut before = HashRing::new(20, None);
        before.add(&nodes);
        let mut after = before.clone();
        after.add(&extra);

        for key in keys {
            let old = before.get(&key).map(str::to_string);
            let new = after.get(&key).map(str::to_string);
            if old != new {
                let new = new.expect("non-empty ring");
                prop_assert!(extra.contains(&new), "key {} moved to old node {}", key, new);
            }
        }
    }
}
