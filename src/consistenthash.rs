//! Consistent Hashing Module
//!
//! Maps keys onto peers through a ring of virtual nodes. Each real node is
//! hashed `replicas` times (`hash("{i}{node}")`) so load spreads evenly and
//! adding a node only remaps the keys that land next to its positions.

use std::collections::HashMap;

/// Hash function used to place nodes and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

// == Hash Ring ==
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Ring positions, always sorted ascending
    keys: Vec<u32>,
    /// Virtual node position -> real node
    nodes: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring. `hash` defaults to CRC-32 (IEEE).
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas,
            keys: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    // == Add ==
    /// Places every node on the ring.
    ///
    /// Two virtual nodes landing on the same position keep whichever was
    /// added last.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            let node = node.as_ref();
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{i}{node}").as_bytes());
                self.keys.push(position);
                self.nodes.insert(position, node.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the node owning `key`, or `None` on an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&position| position < hash);
        // Past the last position wraps around to the first
        let position = self.keys[idx % self.keys.len()];
        self.nodes.get(&position).map(String::as_str)
    }

    /// Number of virtual node positions.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no node has been added.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Treats the input as a decimal number so positions are predictable.
    fn numeric_hash(data: &[u8]) -> u32 {
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    #[test]
    fn test_hashing() {
        let mut ring = HashRing::new(3, Some(numeric_hash as HashFn));

        // Positions: 2, 4, 6, 12, 14, 16, 22, 24, 26
        ring.add(["6", "4", "2"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, node) in cases {
            assert_eq!(ring.get(key), Some(node), "asking for {key}");
        }

        // Adds 8, 18, 28
        ring.add(["8"]);

        // 27 should now map to 8
        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "8")];
        for (key, node) in cases {
            assert_eq!(ring.get(key), Some(node), "asking for {key}");
        }
    }

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new(3, None);
        assert!(ring.is_empty());
        assert_eq!(ring.get("anything"), None);
    }

    #[test]
    fn test_positions_sorted_and_counted() {
        let mut ring = HashRing::new(50, None);
        ring.add(["http://a:8001", "http://b:8002", "http://c:8003"]);

        assert_eq!(ring.len(), 150);
        assert!(ring.keys.windows(2).all(|w| w[0] <= w[1]));
        assert!(ring.keys.iter().all(|k| ring.nodes.contains_key(k)));
    }

    #[test]
    fn test_consistency_across_rings() {
        let mut first = HashRing::new(1, None);
        let mut second = HashRing::new(1, None);

        first.add(["Bill", "Bob", "Bonny"]);
        second.add(["Bob", "Bonny", "Bill"]);

        assert_eq!(first.get("Ben"), second.get("Ben"));

        second.add(["Becky", "Ben", "Bobby"]);

        assert_eq!(first.get("Ben"), second.get("Ben"));
        assert_eq!(first.get("Bob"), second.get("Bob"));
        assert_eq!(first.get("Bonny"), second.get("Bonny"));
    }

    #[test]
    fn test_collision_last_write_wins() {
        fn constant_hash(_data: &[u8]) -> u32 {
            7
        }
        let mut ring = HashRing::new(1, Some(constant_hash as HashFn));
        ring.add(["first"]);
        ring.add(["second"]);

        assert_eq!(ring.len(), 2);
        assert_eq!(ring.get("key"), Some("second"));
    }
}
