//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{BTreeMap, HashMap};

/// Position of a key in recency order: touch timestamp, then touch sequence.
type Rank = (u64, u64);

// == LRU Tracker ==
/// Tracks touch order for LRU eviction.
///
/// Keys are ranked by their last touch timestamp. Keys touched in the same
/// millisecond are ranked by the order in which they were touched.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Keys ordered from least to most recently touched
    order: BTreeMap<Rank, String>,
    /// Current rank of each tracked key
    ranks: HashMap<String, Rank>,
    /// Monotonic touch counter
    seq: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as touched at `now`, making it the most recent among
    /// keys with the same or an earlier timestamp.
    pub fn touch(&mut self, key: &str, now: u64) {
        self.remove(key);
        self.seq += 1;
        let rank = (now, self.seq);
        self.order.insert(rank, key.to_string());
        self.ranks.insert(key.to_string(), rank);
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(rank) = self.ranks.remove(key) {
            self.order.remove(&rank);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently touched key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ranks.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently touched key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.values().next()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ranks.contains_key(key)
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.order.clear();
        self.ranks.clear();
    }
}
