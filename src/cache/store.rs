//! Cache Store Module
//!
//! Size-bounded cache engine combining HashMap storage with LRU tracking
//! and TTL expiration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{
    duration_ms, estimate_size, CacheEntry, CacheStats, Clock, LruTracker, SystemClock,
};

// == Cache Config ==
/// Budget for one cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum total estimated size in bytes
    pub max_size: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
}

impl CacheConfig {
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            max_size,
            default_ttl,
        }
    }
}

// == Bounded Cache ==
/// Key-value cache holding at most `max_size` estimated bytes, with per-entry
/// TTL and least-recently-used eviction.
#[derive(Debug)]
pub struct BoundedCache<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of the sizes of all live entries
    current_size: usize,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl<T> BoundedCache<T>
where
    T: Clone + Serialize,
{
    // == Constructor ==
    /// Creates an empty cache reading time from the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(config.max_size),
            current_size: 0,
            config,
            clock,
        }
    }

    // == Set ==
    /// Stores a value, evicting least recently touched entries until it fits.
    ///
    /// `size` overrides the JSON-length estimate. An existing entry under the
    /// same key is replaced and its TTL reset. An entry larger than the whole
    /// budget is still stored once everything else has been evicted.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: T,
        ttl: Option<Duration>,
        size: Option<usize>,
    ) {
        let key = key.into();
        let size = size.unwrap_or_else(|| estimate_size(&value));
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let now = self.clock.now_ms();

        self.remove_entry(&key);

        while self.current_size + size > self.config.max_size {
            let Some(evicted) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&evicted) {
                self.current_size -= entry.size;
                self.stats.record_eviction();
                debug!(key = %evicted, size = entry.size, "evicted cache entry");
            }
        }

        if size > self.config.max_size {
            warn!(
                key = %key,
                size,
                max_size = self.config.max_size,
                "storing entry larger than the cache budget"
            );
        }

        let entry = CacheEntry::new(value, size, now, duration_ms(ttl));
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key, now);
        self.current_size += size;
        self.sync_occupancy();
    }

    // == Get ==
    /// Returns a clone of the value if present and not expired.
    ///
    /// A hit refreshes the entry's recency. An expired entry is removed.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();
        if self.expire_if_stale(key, now) {
            self.stats.record_miss();
            return None;
        }

        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.touch(now);
                self.lru.touch(key, now);
                self.stats.record_hit();
                Some(entry.data.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Has ==
    /// Checks presence without refreshing recency. Still drops an expired entry.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        if self.expire_if_stale(key, now) {
            return false;
        }
        self.entries.contains_key(key)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        self.sync_occupancy();
        removed
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.current_size = 0;
        self.sync_occupancy();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.remove_entry(&key);
        }

        self.stats.record_expirations(count);
        self.sync_occupancy();
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the estimated sizes of live entries, in bytes.
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Sum of entry sizes recomputed from storage.
    #[cfg(test)]
    pub(crate) fn summed_entry_sizes(&self) -> usize {
        self.entries.values().map(|entry| entry.size).sum()
    }

    // == Internal Helpers ==
    fn remove_entry(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_size -= entry.size;
                self.lru.remove(key);
                true
            }
            None => false,
        }
    }

    /// Drops `key` if it has expired at `now`. Returns true if it did.
    fn expire_if_stale(&mut self, key: &str, now: u64) -> bool {
        let stale = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now));
        if stale {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.sync_occupancy();
        }
        stale
    }

    fn sync_occupancy(&mut self) {
        self.stats.set_occupancy(self.entries.len(), self.current_size);
    }
}
