//! Cache Module
//!
//! Provides the byte-bounded local store used by every group.

mod byteview;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use byteview::ByteView;
pub use lru::{EvictionListener, LruCache};
pub use stats::{CacheStats, GroupStats, GroupStatsSnapshot};
pub use store::CacheStore;

// == Cache Value ==
/// Anything stored in an [`LruCache`] must report its size in bytes.
pub trait CacheValue {
    fn byte_len(&self) -> usize;
}
