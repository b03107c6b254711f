//! API Module
//!
//! HTTP transport between peers.
//!
//! # Endpoints
//! - `GET /_cache/:group/:key` - Serve a value to another node
//! - `GET /stats` - Group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod pool;
pub mod routes;

pub use handlers::*;
pub use pool::{HttpGetter, HttpPool};
pub use routes::create_router;
