//! Cache Module
//!
//! Provides size-bounded in-memory caching with TTL expiration and LRU
//! eviction. Specialized caches in [`crate::caches`] are built on top.

mod clock;
mod entry;
mod handle;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, duration_ms, Clock, ManualClock, SystemClock};
pub use entry::{estimate_size, CacheEntry};
pub use handle::{CacheHandle, SharedCache};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{BoundedCache, CacheConfig};

// == Public Constants ==
/// One mebibyte, for expressing cache budgets
pub const MIB: usize = 1024 * 1024;
