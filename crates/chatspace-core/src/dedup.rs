//! Bounded message-id deduplication.

use std::collections::{HashSet, VecDeque};

/// Default tracked-id capacity.
pub const DEDUP_CAPACITY: usize = 1000;

/// Insertion-ordered set of recently seen message ids.
///
/// The sole gate against double-processing redelivered frames. Eviction on
/// overflow is strict FIFO on insertion order, not recency of lookup.
#[derive(Debug)]
pub struct Deduplicator {
    order: VecDeque<String>,
    seen: HashSet<String>,
    capacity: usize,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEDUP_CAPACITY)
    }
}

impl Deduplicator {
    /// Creates a deduplicator tracking at most `capacity` ids.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Records an id. Returns false if it was already tracked.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string());
        self.order.push_back(id.to_string());
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    /// Returns true if the id is currently tracked.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Number of tracked ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no ids are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut dedup = Deduplicator::new(10);
        assert!(dedup.insert("a"));
        assert!(!dedup.insert("a"));
        assert!(dedup.contains("a"));
        assert!(!dedup.contains("b"));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_fifo_eviction_beyond_capacity() {
        let mut dedup = Deduplicator::new(3);
        for id in ["a", "b", "c", "d"] {
            dedup.insert(id);
        }
        assert_eq!(dedup.len(), 3);
        assert!(!dedup.contains("a"));
        assert!(dedup.contains("b"));
        assert!(dedup.contains("d"));
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut dedup = Deduplicator::default();
        for i in 0..2500 {
            dedup.insert(&format!("id-{i}"));
            assert!(dedup.len() <= DEDUP_CAPACITY);
        }
        assert_eq!(dedup.len(), DEDUP_CAPACITY);
        // the most recent 1000 survive
        assert!(dedup.contains("id-2499"));
        assert!(dedup.contains("id-1500"));
        assert!(!dedup.contains("id-1499"));
    }

    #[test]
    fn test_evicted_id_reinsertable() {
        let mut dedup = Deduplicator::new(2);
        dedup.insert("a");
        dedup.insert("b");
        dedup.insert("c");
        // "a" was evicted, so it reads as fresh again
        assert!(dedup.insert("a"));
    }
}
