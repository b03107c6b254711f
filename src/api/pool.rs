//! HTTP Peer Pool
//!
//! Picks the owning peer of a key with a [`HashRing`] and fetches from it
//! over HTTP.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::cache::ByteView;
use crate::config::Config;
use crate::consistenthash::HashRing;
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};

// == HTTP Getter ==
/// Client for one remote peer, rooted at `<peer><base_path>`.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: Client,
}

impl HttpGetter {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Builds `<base_url><group>/<key>` with both segments percent-encoded.
    fn url(&self, group: &str, key: &str) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| CacheError::Internal(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| CacheError::Internal(format!("not a base url: {}", self.base_url)))?
            .pop_if_empty()
            .push(group)
            .push(key);
        Ok(url)
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, group: &str, key: &str) -> Result<ByteView> {
        let url = self.url(group, key)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CacheError::Peer(format!("server returned {status}: {body}")));
        }

        let bytes = response.bytes().await?;
        Ok(ByteView::from(bytes))
    }
}

// == HTTP Pool ==
/// Drops trailing slashes so `http://a:8001/` and `http://a:8001` name one node.
fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

/// The set of peers this node shares its groups with.
pub struct HttpPool {
    self_url: String,
    base_path: String,
    replicas: usize,
    client: Client,
    state: RwLock<PoolState>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node reachable at `self_url`, e.g.
    /// `http://10.0.0.2:8008`.
    pub fn new(
        self_url: impl AsRef<str>,
        base_path: impl Into<String>,
        replicas: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CacheError::Internal(err.to_string()))?;

        Ok(Self {
            self_url: normalize_url(self_url.as_ref()),
            base_path: base_path.into(),
            replicas,
            client,
            state: RwLock::new(PoolState {
                ring: HashRing::new(replicas, None),
                getters: HashMap::new(),
            }),
        })
    }

    /// Creates a pool from configuration and installs the configured peers.
    pub fn from_config(config: &Config) -> Result<Self> {
        let pool = Self::new(
            config.self_url.clone(),
            config.base_path.clone(),
            config.replicas,
            Duration::from_millis(config.peer_timeout_ms),
        )?;
        pool.set_peers(&config.peers);
        Ok(pool)
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    // == Set Peers ==
    /// Replaces the peer list. Each entry is a base URL such as
    /// `http://10.0.0.1:8008`; this node's own URL should be included.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| normalize_url(p.as_ref())).collect();

        let mut ring = HashRing::new(self.replicas, None);
        ring.add(&peers);
        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(format!("{peer}{}", self.base_path), self.client.clone());
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = PoolState { ring, getters };
        info!(self_url = %self.self_url, ?peers, "peers set");
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let peer = state.ring.get(key).filter(|peer| *peer != self.self_url)?;
        debug!(key, peer, "picked peer");
        state
            .getters
            .get(peer)
            .map(|getter| Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(self_url: &str) -> HttpPool {
        HttpPool::new(self_url, "/_cache/", 50, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_url_escapes_segments() {
        let getter = HttpGetter::new("http://localhost:8001/_cache/", Client::new());
        let url = getter.url("scores", "a b/c").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/_cache/scores/a%20b%2Fc");
    }

    #[test]
    fn test_no_peers_picks_nothing() {
        let pool = pool("http://localhost:8001");
        assert!(pool.pick_peer("Tom").is_none());
    }

    #[test]
    fn test_self_is_never_picked() {
        let pool = pool("http://localhost:8001");
        pool.set_peers(["http://localhost:8001"]);

        for key in ["Tom", "Jack", "Sam", "unknown"] {
            assert!(pool.pick_peer(key).is_none());
        }
    }

    #[test]
    fn test_trailing_slashes_still_match_self() {
        let slashed_self = pool("http://localhost:8001/");
        assert_eq!(slashed_self.self_url(), "http://localhost:8001");
        slashed_self.set_peers(["http://localhost:8001"]);

        let slashed_peer = pool("http://localhost:8001");
        slashed_peer.set_peers(["http://localhost:8001/"]);

        for key in ["Tom", "Jack", "Sam"] {
            assert!(slashed_self.pick_peer(key).is_none());
            assert!(slashed_peer.pick_peer(key).is_none());
        }
    }

    #[test]
    fn test_keys_spread_over_remote_peers() {
        let pool = pool("http://localhost:8001");
        pool.set_peers([
            "http://localhost:8001",
            "http://localhost:8002",
            "http://localhost:8003",
        ]);

        let remote = (0..300)
            .filter(|i| pool.pick_peer(&format!("key-{i}")).is_some())
            .count();
        assert!(remote > 0 && remote < 300);
    }
}
