//! Cache Handle Module
//!
//! Owns a shared [`BoundedCache`] together with its background sweep task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{BoundedCache, CacheConfig, CacheStats, Clock};
use crate::tasks::spawn_sweep_task;

/// Cache shared between request handlers and the sweep task.
pub type SharedCache<T> = Arc<RwLock<BoundedCache<T>>>;

// == Cache Handle ==
/// A named cache instance with an explicit lifecycle.
///
/// `destroy` consumes the handle, so the sweep task is cancelled exactly once.
#[derive(Debug)]
pub struct CacheHandle<T> {
    name: &'static str,
    cache: SharedCache<T>,
    sweep: Option<JoinHandle<()>>,
}

impl<T> CacheHandle<T>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    pub fn new(name: &'static str, config: CacheConfig) -> Self {
        Self::from_store(name, BoundedCache::new(config))
    }

    pub fn with_clock(name: &'static str, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_store(name, BoundedCache::with_clock(config, clock))
    }

    fn from_store(name: &'static str, store: BoundedCache<T>) -> Self {
        Self {
            name,
            cache: Arc::new(RwLock::new(store)),
            sweep: None,
        }
    }

    // == Background Sweep ==
    /// Starts the periodic expiry sweep. A running sweep is replaced.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_sweep(&mut self, interval: Duration) {
        if let Some(previous) = self.sweep.take() {
            previous.abort();
        }
        self.sweep = Some(spawn_sweep_task(self.name, self.cache.clone(), interval));
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweep.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Shared store, for callers that need several operations under one lock.
    pub fn shared(&self) -> SharedCache<T> {
        self.cache.clone()
    }

    // == Operations ==
    pub async fn get(&self, key: &str) -> Option<T> {
        self.cache.write().await.get(key)
    }

    pub async fn set(
        &self,
        key: impl Into<String>,
        value: T,
        ttl: Option<Duration>,
        size: Option<usize>,
    ) {
        self.cache.write().await.set(key, value, ttl, size);
    }

    /// Presence check. Takes the write lock because it may drop an expired entry.
    pub async fn has(&self, key: &str) -> bool {
        self.cache.write().await.has(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.cache.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Get Or Compute ==
    /// Returns the cached value, or runs `compute` and caches its success.
    ///
    /// The lock is not held while `compute` runs, so two callers missing the
    /// same key may both compute; the later write wins. A failed compute
    /// leaves the cache untouched and its error is returned as is.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_compute_sized(key, |_| None, compute).await
    }

    /// Like [`get_or_compute`](Self::get_or_compute) with a caller-chosen size
    /// for the stored value.
    pub async fn get_or_compute_sized<S, F, Fut, E>(
        &self,
        key: &str,
        size_of: S,
        compute: F,
    ) -> Result<T, E>
    where
        S: FnOnce(&T) -> Option<usize>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key).await {
            debug!(cache = self.name, key, "cache hit");
            return Ok(hit);
        }

        debug!(cache = self.name, key, "cache miss, computing");
        let value = compute().await?;
        let size = size_of(&value);
        self.set(key, value.clone(), None, size).await;
        Ok(value)
    }

    // == Destroy ==
    /// Cancels the sweep and empties the cache.
    pub async fn destroy(mut self) {
        if let Some(task) = self.sweep.take() {
            task.abort();
        }
        self.cache.write().await.clear();
        debug!(cache = self.name, "cache destroyed");
    }
}

impl<T> Drop for CacheHandle<T> {
    fn drop(&mut self) {
        if let Some(task) = self.sweep.take() {
            task.abort();
        }
    }
}
