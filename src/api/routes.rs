//! API Routes
//!
//! Configures the Axum router a node exposes to its peers.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{empty_key_handler, health_handler, peer_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET {base_path}:group/:key` - Raw value bytes for a peer
/// - `GET {base_path}:group/` - 400, the key is empty
/// - `GET /stats` - Group statistics
/// - `GET /health` - Health check endpoint
///
/// `base_path` must start and end with `/`, e.g. `/_cache/`.
pub fn create_router(state: AppState, base_path: &str) -> Router {
    Router::new()
        .route(&format!("{base_path}:group/:key"), get(peer_handler))
        .route(&format!("{base_path}:group/"), get(empty_key_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
