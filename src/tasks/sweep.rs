//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, so
//! memory stays bounded even for keys that are never read again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::BoundedCache;

/// Spawns a task that calls [`BoundedCache::cleanup_expired`] every `interval`.
///
/// The task only deletes entries. It runs until the returned handle is
/// aborted, which [`crate::cache::CacheHandle::destroy`] does.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(BoundedCache::new(config)));
/// let sweep = spawn_sweep_task("ocr", cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_sweep_task<T>(
    name: &'static str,
    cache: Arc<RwLock<BoundedCache<T>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            cache = name,
            "Starting expiry sweep with interval of {} ms",
            interval.as_millis()
        );

        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let (removed, remaining) = {
                let mut guard = cache.write().await;
                let removed = guard.cleanup_expired();
                (removed, guard.len())
            };

            if removed > 0 {
                info!(cache = name, removed, remaining, "Expiry sweep removed entries");
            } else {
                debug!(cache = name, "Expiry sweep: no expired entries found");
            }
        }
    })
}
