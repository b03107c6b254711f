//! Peercache - A distributed read-through cache
//!
//! Every node keeps a byte-bounded LRU per group, routes misses to the peer
//! owning the key on a consistent hash ring, and loads each missing key once
//! however many callers ask for it concurrently.

pub mod api;
pub mod cache;
pub mod config;
pub mod consistenthash;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod registry;
pub mod singleflight;

pub use api::{AppState, HttpPool};
pub use cache::ByteView;
pub use config::Config;
pub use error::CacheError;
pub use group::{Getter, GetterFn, Group, GroupBuilder};
pub use peers::{PeerGetter, PeerPicker};
pub use registry::Registry;
