//! Peer Capabilities
//!
//! The seams between a group and whatever transport reaches other nodes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::ByteView;
use crate::error::Result;

/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when the key belongs to this node
    /// or no peers are known.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches a value from a remote peer's group.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, group: &str, key: &str) -> Result<ByteView>;
}
