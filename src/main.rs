//! Peercache - A distributed read-through cache
//!
//! Demo node serving a `scores` group backed by a slow in-memory database.
//!
//! ```text
//! $ curl http://localhost:9999/_cache/scores/Tom
//! 630
//!
//! $ curl http://localhost:9999/_cache/scores/kkk
//! {"error":"kkk not exist"}
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::api::create_router;
use peercache::{AppState, Config, GetterFn, GroupBuilder, HttpPool, Registry};

/// Lookup against the demo database.
fn slow_db(key: &str) -> anyhow::Result<Vec<u8>> {
    info!(key, "[SlowDB] search key");
    match key {
        "Tom" => Ok(b"630".to_vec()),
        "Jack" => Ok(b"589".to_vec()),
        "Sam" => Ok(b"567".to_vec()),
        _ => Err(anyhow!("{key} not exist")),
    }
}

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the peer pool and the `scores` group
/// 4. Start HTTP server on configured port
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting peercache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_bytes={}, self_url={}, peers={:?}, replicas={}",
        config.cache_bytes, config.self_url, config.peers, config.replicas
    );

    let pool = Arc::new(HttpPool::from_config(&config)?);
    let registry = Arc::new(Registry::new());
    registry.register(
        GroupBuilder::new("scores", config.cache_bytes, GetterFn::new(slow_db))
            .peers(pool)
            .hot_cache_bytes(config.hot_cache_bytes)
            .build(),
    );

    let app = create_router(AppState::new(registry), &config.base_path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("cache is running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
