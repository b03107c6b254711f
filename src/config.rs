//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget of each group's main cache (0 = unbounded)
    pub cache_bytes: u64,
    /// Byte budget for values fetched from peers (0 = disabled)
    pub hot_cache_bytes: u64,
    /// HTTP server port
    pub server_port: u16,
    /// URL other peers reach this node at
    pub self_url: String,
    /// Base URLs of every node sharing the groups, this one included
    pub peers: Vec<String>,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Path prefix of the peer endpoint, always wrapped in `/`
    pub base_path: String,
    /// Timeout for one request to a peer, in milliseconds
    pub peer_timeout_ms: u64,
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Wraps a path in slashes: `_cache` -> `/_cache/`.
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

fn parse_peers(list: &str) -> Vec<String> {
    list.split(',')
        .map(|peer| peer.trim().trim_end_matches('/'))
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BYTES` - Main cache budget per group (default: 2048)
    /// - `HOT_CACHE_BYTES` - Peer value cache budget (default: 0, disabled)
    /// - `SERVER_PORT` - HTTP server port (default: 9999)
    /// - `SELF_URL` - This node's URL (default: `http://localhost:<port>`)
    /// - `PEERS` - Comma-separated peer URLs (default: this node only)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `BASE_PATH` - Peer endpoint prefix (default: `/_cache/`)
    /// - `PEER_TIMEOUT_MS` - Peer request timeout (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let server_port = parse_var("SERVER_PORT", defaults.server_port);
        let self_url = env::var("SELF_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://localhost:{server_port}"));
        let peers = env::var("PEERS")
            .map(|list| parse_peers(&list))
            .ok()
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_url.clone()]);

        Self {
            cache_bytes: parse_var("CACHE_BYTES", defaults.cache_bytes),
            hot_cache_bytes: parse_var("HOT_CACHE_BYTES", defaults.hot_cache_bytes),
            server_port,
            self_url,
            peers,
            replicas: parse_var("REPLICAS", defaults.replicas),
            base_path: env::var("BASE_PATH")
                .map(|path| normalize_base_path(&path))
                .unwrap_or(defaults.base_path),
            peer_timeout_ms: parse_var("PEER_TIMEOUT_MS", defaults.peer_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let self_url = "http://localhost:9999".to_string();
        Self {
            cache_bytes: 2 << 10,
            hot_cache_bytes: 0,
            server_port: 9999,
            peers: vec![self_url.clone()],
            self_url,
            replicas: 50,
            base_path: "/_cache/".to_string(),
            peer_timeout_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.hot_cache_bytes, 0);
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.peers, vec!["http://localhost:9999"]);
        assert_eq!(config.replicas, 50);
        assert_eq!(config.base_path, "/_cache/");
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for var in [
            "CACHE_BYTES",
            "HOT_CACHE_BYTES",
            "SERVER_PORT",
            "SELF_URL",
            "PEERS",
            "REPLICAS",
            "BASE_PATH",
            "PEER_TIMEOUT_MS",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.self_url, "http://localhost:9999");
        assert_eq!(config.peers, vec![config.self_url.clone()]);
        assert_eq!(config.peer_timeout_ms, 2000);
    }

    #[test]
    fn test_parse_peers() {
        let peers = parse_peers(" http://a:8001/, ,http://b:8002 ");
        assert_eq!(peers, vec!["http://a:8001", "http://b:8002"]);
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("_cache"), "/_cache/");
        assert_eq!(normalize_base_path("/groups/"), "/groups/");
        assert_eq!(normalize_base_path(""), "/");
    }
}
