//! API Handlers
//!
//! HTTP request handlers for the peer endpoint and diagnostics.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::{CacheError, Result};
use crate::models::{GroupStatsResponse, HealthResponse, StatsResponse};
use crate::registry::Registry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups this node serves
    pub registry: Arc<Registry>,
}

impl AppState {
    /// Creates a new AppState over the given registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

/// Handler for GET {base_path}:group/:key
///
/// Serves a read from another node: raw value bytes on success.
pub async fn peer_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let value = state.registry.serve(&group, &key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        value.to_bytes(),
    ))
}

/// Handler for GET {base_path}:group/ (empty key segment)
pub async fn empty_key_handler(Path(_group): Path<String>) -> CacheError {
    CacheError::EmptyKey
}

/// Handler for GET /stats
///
/// Returns counters for every registered group.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let groups = state
        .registry
        .names()
        .iter()
        .filter_map(|name| state.registry.get_group(name))
        .map(|group| GroupStatsResponse::from_group(&group))
        .collect();

    Json(StatsResponse { groups })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
