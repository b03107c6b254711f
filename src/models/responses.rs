//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing JSON bodies. Peer reads return raw
//! bytes and have no DTO.

use serde::Serialize;

use crate::cache::{CacheStats, GroupStatsSnapshot};
use crate::group::Group;

/// Statistics of one group
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatsResponse {
    /// Group name
    pub name: String,
    /// Request and load counters
    pub stats: GroupStatsSnapshot,
    /// Store holding values loaded from the source
    pub main_cache: CacheStats,
    /// Store holding values fetched from peers, when enabled
    pub hot_cache: Option<CacheStats>,
    /// Share of gets served without a load
    pub hit_rate: f64,
}

impl GroupStatsResponse {
    /// Snapshots a live group
    pub fn from_group(group: &Group) -> Self {
        let stats = group.stats().snapshot();
        let hit_rate = if stats.gets > 0 {
            stats.cache_hits as f64 / stats.gets as f64
        } else {
            0.0
        };
        Self {
            name: group.name().to_string(),
            stats,
            main_cache: group.cache_stats(),
            hot_cache: group.hot_cache_stats(),
            hit_rate,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub groups: Vec<GroupStatsResponse>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GetterFn;

    #[tokio::test]
    async fn test_group_stats_response() {
        let group = Group::new(
            "scores",
            0,
            GetterFn::new(|_key: &str| Ok(b"630".to_vec())),
        );
        group.get("Tom").await.unwrap();
        group.get("Tom").await.unwrap();

        let resp = GroupStatsResponse::from_group(&group);
        assert_eq!(resp.name, "scores");
        assert_eq!(resp.stats.gets, 2);
        assert_eq!(resp.main_cache.items, 1);
        assert!(resp.hot_cache.is_none());
        assert!((resp.hit_rate - 0.5).abs() < 0.001);

        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"local_loads\":1"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("no such group: x");
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"error":"no such group: x"}"#);
    }
}
