//! Byte View Module
//!
//! Immutable snapshot of a cached value.

use std::fmt;

use bytes::Bytes;

use crate::cache::CacheValue;

// == Byte View ==
/// An immutable view of bytes.
///
/// Clones share the same frozen buffer. Owned copies handed out through
/// [`ByteView::byte_slice`] are independent, so callers can never mutate
/// what the cache holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    // == Constructors ==
    /// Creates a view holding a private copy of `data`.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    // == Length ==
    /// Returns the length of the view in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the view holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // == Accessors ==
    /// Returns an owned copy of the data.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Returns a cheap handle on the frozen buffer.
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl From<Vec<u8>> for ByteView {
    /// Takes ownership of the buffer; the caller keeps no handle on it.
    fn from(data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
        }
    }
}

impl From<Bytes> for ByteView {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self::copy_from_slice(data.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl CacheValue for ByteView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}
