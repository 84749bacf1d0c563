//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with size and TTL
//! metadata.

use serde::Serialize;

// == Cache Entry ==
/// A single cached value with its accounting metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub data: T,
    /// Last touch timestamp (Unix milliseconds). Set on insert, refreshed on read hit.
    pub created_at: u64,
    /// Estimated size in bytes
    pub size: usize,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stored at `now` with the given TTL in milliseconds.
    pub fn new(data: T, size: usize, now: u64, ttl_ms: u64) -> Self {
        Self {
            data,
            created_at: now,
            size,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at time `now`.
    ///
    /// An entry stays readable up to and including `expires_at`; it is
    /// expired strictly after.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }

    // == Touch ==
    /// Refreshes the recency timestamp. `expires_at` is left untouched.
    pub fn touch(&mut self, now: u64) {
        self.created_at = now;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

// == Size Estimation ==
/// Estimates the in-memory footprint of a value from its JSON length.
///
/// A larger payload never produces a smaller estimate. Values that fail to
/// serialize fall back to their stack size.
pub fn estimate_size<T: Serialize>(value: &T) -> usize {
    serde_json::to_vec(value)
        .map(|bytes| bytes.len())
        .unwrap_or_else(|_| std::mem::size_of::<T>())
        .max(1)
}
