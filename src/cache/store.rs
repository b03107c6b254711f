//! Cache Store Module
//!
//! Thread-safe wrapper around [`LruCache`] holding [`ByteView`] values.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::cache::{ByteView, CacheStats, LruCache};

// == Cache Store ==
/// Byte-bounded LRU store shared by all callers of a group.
///
/// One lock covers the whole lookup/insert/evict sequence so recency order
/// and the byte counter always move together. The critical section is pure
/// in-memory work and is never held across an await.
#[derive(Debug)]
pub struct CacheStore {
    lru: Mutex<LruCache<ByteView>>,
    gets: AtomicU64,
    hits: AtomicU64,
    evictions: Arc<AtomicU64>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store bounded to `max_bytes` (0 = unbounded).
    pub fn new(max_bytes: u64) -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&evictions);
        let lru = LruCache::with_listener(max_bytes, move |key: &str, value: &ByteView| {
            counter.fetch_add(1, Ordering::Relaxed);
            debug!(key, bytes = value.len(), "evicted cache entry");
        });

        Self {
            lru: Mutex::new(lru),
            gets: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            evictions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<ByteView>> {
        self.lru.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Looks up a key, promoting it on hit.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        let value = self.lock().get(key).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Looks up a key, promoting it on hit, without counting the lookup.
    pub fn peek(&self, key: &str) -> Option<ByteView> {
        self.lock().get(key).cloned()
    }

    // == Add ==
    /// Inserts a value, evicting older entries as needed.
    pub fn add(&self, key: &str, value: ByteView) {
        self.lock().add(key, value);
    }

    // == Stats ==
    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let lru = self.lock();
        CacheStats {
            bytes: lru.used_bytes(),
            items: lru.len(),
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Checks for a key without counting a lookup or touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }
}
