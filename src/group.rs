//! Group Module
//!
//! A group is a cache namespace: one local store, one authoritative source
//! and optionally a set of peers sharing the key space.
//!
//! `get` runs the read-through pipeline:
//! 1. reject empty keys
//! 2. serve from the local store on hit
//! 3. otherwise load once per key, however many callers are waiting:
//!    from the owning peer if that is another node, else from the source
//! 4. values loaded from the source populate the local store

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::cache::{ByteView, CacheStats, CacheStore, GroupStats};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::Flight;

// == Getter ==
/// Loads a value from the authoritative source.
///
/// Errors are handed to the caller of [`Group::get`] unchanged.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapts a plain function into a [`Getter`].
pub struct GetterFn<F>(F);

impl<F> GetterFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}

// == Group Builder ==
/// Collects a group's wiring before it starts serving.
///
/// The peer picker is only settable here, so a live group never changes
/// how it routes keys.
pub struct GroupBuilder {
    name: String,
    cache_bytes: u64,
    hot_cache_bytes: u64,
    getter: Box<dyn Getter>,
    peers: Option<Arc<dyn PeerPicker>>,
}

impl GroupBuilder {
    /// Starts a group named `name` whose local store holds `cache_bytes`
    /// (0 = unbounded).
    pub fn new(name: impl Into<String>, cache_bytes: u64, getter: impl Getter + 'static) -> Self {
        Self {
            name: name.into(),
            cache_bytes,
            hot_cache_bytes: 0,
            getter: Box::new(getter),
            peers: None,
        }
    }

    /// Routes misses through `peers` before falling back to the source.
    pub fn peers(mut self, peers: Arc<dyn PeerPicker>) -> Self {
        self.peers = Some(peers);
        self
    }

    /// Keeps values fetched from peers in a separate store of this size.
    /// 0 (the default) never caches remote values.
    pub fn hot_cache_bytes(mut self, bytes: u64) -> Self {
        self.hot_cache_bytes = bytes;
        self
    }

    pub fn build(self) -> Group {
        Group {
            name: self.name,
            getter: self.getter,
            main_cache: CacheStore::new(self.cache_bytes),
            hot_cache: (self.hot_cache_bytes > 0).then(|| CacheStore::new(self.hot_cache_bytes)),
            peers: self.peers,
            loader: Flight::new(),
            stats: GroupStats::default(),
        }
    }
}

// == Group ==
/// A cache namespace and the data loaded into it.
pub struct Group {
    name: String,
    getter: Box<dyn Getter>,
    main_cache: CacheStore,
    hot_cache: Option<CacheStore>,
    peers: Option<Arc<dyn PeerPicker>>,
    loader: Flight<ByteView, CacheError>,
    stats: GroupStats,
}

impl Group {
    /// Shorthand for a single-node group with no peers.
    pub fn new(name: impl Into<String>, cache_bytes: u64, getter: impl Getter + 'static) -> Self {
        GroupBuilder::new(name, cache_bytes, getter).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        GroupStats::incr(&self.stats.gets);

        if let Some(value) = self.lookup_cache(key) {
            debug!(group = %self.name, key, "cache hit");
            GroupStats::incr(&self.stats.cache_hits);
            return Ok(value);
        }

        self.load(key).await
    }

    fn lookup_cache(&self, key: &str) -> Option<ByteView> {
        self.main_cache
            .get(key)
            .or_else(|| self.hot_cache.as_ref().and_then(|hot| hot.get(key)))
    }

    /// Same as `lookup_cache` but leaves the store counters alone.
    fn peek_cache(&self, key: &str) -> Option<ByteView> {
        self.main_cache
            .peek(key)
            .or_else(|| self.hot_cache.as_ref().and_then(|hot| hot.peek(key)))
    }

    // == Load ==
    /// Loads `key` once no matter how many callers miss on it concurrently.
    async fn load(&self, key: &str) -> Result<ByteView> {
        GroupStats::incr(&self.stats.loads);
        self.loader
            .run(key, || async {
                // A previous generation may have filled the cache meanwhile
                if let Some(value) = self.peek_cache(key) {
                    GroupStats::incr(&self.stats.cache_hits);
                    return Ok(value);
                }
                GroupStats::incr(&self.stats.loads_deduped);

                if let Some(peer) = self.peers.as_ref().and_then(|p| p.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => {
                            GroupStats::incr(&self.stats.peer_loads);
                            return Ok(value);
                        }
                        Err(err) => {
                            GroupStats::incr(&self.stats.peer_errors);
                            warn!(group = %self.name, key, error = %err, "failed to get from peer");
                        }
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let value = peer.get(&self.name, key).await?;
        if let Some(hot) = &self.hot_cache {
            hot.add(key, value.clone());
        }
        Ok(value)
    }

    /// Loads from the source and populates the main cache.
    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        info!(group = %self.name, key, "loading from source");
        match self.getter.get(key).await {
            Ok(bytes) => {
                GroupStats::incr(&self.stats.local_loads);
                // The view takes ownership; nothing else can reach the buffer
                let value = ByteView::from(bytes);
                self.main_cache.add(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                GroupStats::incr(&self.stats.local_load_errs);
                Err(err.into())
            }
        }
    }

    // == Stats ==
    pub fn stats(&self) -> &GroupStats {
        &self.stats
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.main_cache.stats()
    }

    pub fn hot_cache_stats(&self) -> Option<CacheStats> {
        self.hot_cache.as_ref().map(CacheStore::stats)
    }

    /// Checks the main cache without counting a lookup.
    pub fn is_cached(&self, key: &str) -> bool {
        self.main_cache.contains(key)
    }
}
