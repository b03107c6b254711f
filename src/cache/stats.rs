//! Cache Statistics Module
//!
//! Tracks store and group counters: hits, loads, peer traffic and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time statistics of one [`CacheStore`](crate::cache::CacheStore).
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    /// Bytes held by keys and values
    pub bytes: u64,
    /// Current number of entries
    pub items: usize,
    /// Number of lookups
    pub gets: u64,
    /// Number of lookups that found an entry
    pub hits: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / gets, or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }
}

// == Group Stats ==
/// Live counters of one group. Updated concurrently by every caller.
#[derive(Debug, Default)]
pub struct GroupStats {
    /// Any get request, including those served from peers
    pub gets: AtomicU64,
    /// Served from the main or hot cache
    pub cache_hits: AtomicU64,
    /// Remote loads that succeeded
    pub peer_loads: AtomicU64,
    /// Remote loads that failed and fell back to the source
    pub peer_errors: AtomicU64,
    /// Gets that missed the cache
    pub loads: AtomicU64,
    /// Loads that actually ran after deduplication
    pub loads_deduped: AtomicU64,
    /// Successful loads from the authoritative source
    pub local_loads: AtomicU64,
    /// Failed loads from the authoritative source
    pub local_load_errs: AtomicU64,
}

impl GroupStats {
    /// Increments a counter.
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a consistent-enough copy of every counter.
    pub fn snapshot(&self) -> GroupStatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        GroupStatsSnapshot {
            gets: load(&self.gets),
            cache_hits: load(&self.cache_hits),
            peer_loads: load(&self.peer_loads),
            peer_errors: load(&self.peer_errors),
            loads: load(&self.loads),
            loads_deduped: load(&self.loads_deduped),
            local_loads: load(&self.local_loads),
            local_load_errs: load(&self.local_load_errs),
        }
    }
}

/// Plain copy of [`GroupStats`].
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GroupStatsSnapshot {
    pub gets: u64,
    pub cache_hits: u64,
    pub peer_loads: u64,
    pub peer_errors: u64,
    pub loads: u64,
    pub loads_deduped: u64,
    pub local_loads: u64,
    pub local_load_errs: u64,
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats {
            gets: 4,
            hits: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.25);
    }

    #[test]
    fn test_group_stats_snapshot() {
        let stats = GroupStats::default();
        GroupStats::incr(&stats.gets);
        GroupStats::incr(&stats.gets);
        GroupStats::incr(&stats.peer_errors);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.gets, 2);
        assert_eq!(snapshot.peer_errors, 1);
        assert_eq!(snapshot.local_loads, 0);
    }
}
