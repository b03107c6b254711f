//! LRU Module
//!
//! Byte-bounded store with least recently used eviction.

use std::collections::HashMap;

use crate::cache::CacheValue;

// == Eviction Listener ==
/// Observer notified whenever an entry is evicted.
///
/// Runs synchronously inside [`LruCache::add`] and [`LruCache::remove_oldest`].
pub trait EvictionListener<V>: Send + Sync {
    fn on_evicted(&self, key: &str, value: &V);
}

impl<V, F> EvictionListener<V> for F
where
    F: Fn(&str, &V) + Send + Sync,
{
    fn on_evicted(&self, key: &str, value: &V) {
        self(key, value)
    }
}

// == Node ==
/// Slot in the recency list. Links are indices into `LruCache::nodes`.
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Key/value store holding at most `max_bytes` of keys plus values.
///
/// Recency is kept in an intrusive doubly linked list laid out in a slab:
/// - `head` = most recently used
/// - `tail` = least recently used
///
/// A `max_bytes` of 0 means unbounded.
pub struct LruCache<V> {
    max_bytes: u64,
    used_bytes: u64,
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<Box<dyn EvictionListener<V>>>,
}

impl<V: CacheValue> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            nodes: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted: None,
        }
    }

    /// Creates an empty cache that reports evictions to `listener`.
    pub fn with_listener(max_bytes: u64, listener: impl EvictionListener<V> + 'static) -> Self {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(Box::new(listener));
        cache
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts until within budget.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(&idx) = self.index.get(&key) {
            self.move_to_front(idx);
            if let Some(node) = self.nodes[idx].as_mut() {
                let old_len = node.value.byte_len() as u64;
                self.used_bytes = self.used_bytes - old_len + value.byte_len() as u64;
                node.value = value;
            }
        } else {
            self.used_bytes += (key.len() + value.byte_len()) as u64;
            let idx = self.alloc(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.push_front(idx);
            self.index.insert(key, idx);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry. No-op when empty.
    pub fn remove_oldest(&mut self) {
        let Some(idx) = self.tail else {
            return;
        };
        self.unlink(idx);
        if let Some(node) = self.nodes[idx].take() {
            self.free.push(idx);
            self.index.remove(&node.key);
            self.used_bytes -= (node.key.len() + node.value.byte_len()) as u64;
            if let Some(listener) = &self.on_evicted {
                listener.on_evicted(&node.key, &node.value);
            }
        }
    }

    // == Diagnostics ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently consumed by keys and values.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Byte budget; 0 means unbounded.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks for a key without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == List Plumbing ==
    fn alloc(&mut self, node: Node<V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn link(&mut self, idx: usize) -> (Option<usize>, Option<usize>) {
        self.nodes[idx]
            .as_ref()
            .map(|node| (node.prev, node.next))
            .unwrap_or((None, None))
    }

    fn set_prev(&mut self, idx: usize, prev: Option<usize>) {
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, idx: usize, next: Option<usize>) {
        if let Some(node) = self.nodes[idx].as_mut() {
            node.next = next;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = self.link(idx);
        match prev {
            Some(p) => self.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.set_prev(n, prev),
            None => self.tail = prev,
        }
        self.set_prev(idx, None);
        self.set_next(idx, None);
    }

    fn push_front(&mut self, idx: usize) {
        self.set_next(idx, self.head);
        self.set_prev(idx, None);
        if let Some(old_head) = self.head {
            self.set_prev(old_head, Some(idx));
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

impl<V> std::fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.index.len())
            .finish()
    }
}
