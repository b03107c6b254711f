//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for groups, peers and the HTTP transport.
///
/// Cloneable so a single load outcome can be handed to every caller that
/// waited on it.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Empty key passed to `Group::get`
    #[error("key is required")]
    EmptyKey,

    /// No group registered under this name
    #[error("no such group: {0}")]
    NoSuchGroup(String),

    /// The authoritative source failed; displayed verbatim
    #[error("{0}")]
    Source(Arc<anyhow::Error>),

    /// A remote peer could not serve the request
    #[error("peer request failed: {0}")]
    Peer(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for CacheError {
    fn from(err: anyhow::Error) -> Self {
        CacheError::Source(Arc::new(err))
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Peer(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::EmptyKey => StatusCode::BAD_REQUEST,
            CacheError::NoSuchGroup(_) => StatusCode::NOT_FOUND,
            CacheError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
