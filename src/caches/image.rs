//! Image Cache
//!
//! Compressed page images keyed by source URL and quality.

use std::future::Future;
use std::sync::Arc;

use crate::cache::{CacheConfig, CacheHandle, CacheStats, Clock};
use crate::collaborators::{CompressedImage, CompressionError, ImageCompressor};

#[derive(Debug)]
pub struct ImageCache {
    inner: CacheHandle<CompressedImage>,
}

impl ImageCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: CacheHandle::new("image", config),
        }
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: CacheHandle::with_clock("image", config, clock),
        }
    }

    /// `url-quality`
    pub fn key(url: &str, quality: u8) -> String {
        format!("{}-{}", url, quality)
    }

    /// Entries are accounted by their byte length.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<CompressedImage, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CompressedImage, E>>,
    {
        self.inner
            .get_or_compute_sized(key, |image| Some(image.len()), compute)
            .await
    }

    pub async fn get_or_compress(
        &self,
        compressor: &dyn ImageCompressor,
        url: &str,
        quality: u8,
    ) -> Result<CompressedImage, CompressionError> {
        let key = Self::key(url, quality);
        self.get_or_compute(&key, || compressor.compress(url, quality))
            .await
    }

    pub fn handle(&self) -> &CacheHandle<CompressedImage> {
        &self.inner
    }

    pub fn handle_mut(&mut self) -> &mut CacheHandle<CompressedImage> {
        &mut self.inner
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.stats().await
    }

    pub async fn destroy(self) {
        self.inner.destroy().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingCompressor {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ImageCompressor for CountingCompressor {
        async fn compress(&self, url: &str, quality: u8) -> Result<CompressedImage, CompressionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CompressionError::Failed(url.to_string()));
            }
            Ok(CompressedImage {
                mime_type: "image/jpeg".to_string(),
                quality,
                bytes: vec![0u8; 600],
            })
        }
    }

    fn cache(max_size: usize) -> (ImageCache, ManualClock) {
        let clock = ManualClock::new(0);
        let config = CacheConfig::new(max_size, Duration::from_secs(7_200));
        (ImageCache::with_clock(config, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_key_format() {
        assert_eq!(ImageCache::key("https://x/p1.png", 80), "https://x/p1.png-80");
    }

    #[tokio::test]
    async fn test_compress_once_per_url_and_quality() {
        let (cache, _) = cache(10_000);
        let compressor = CountingCompressor { calls: AtomicUsize::new(0), fail: false };

        cache.get_or_compress(&compressor, "p1.png", 80).await.unwrap();
        cache.get_or_compress(&compressor, "p1.png", 80).await.unwrap();
        cache.get_or_compress(&compressor, "p1.png", 60).await.unwrap();

        assert_eq!(compressor.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().await.total_size, 1_200);
    }

    #[tokio::test]
    async fn test_byte_budget_evicts_oldest_image() {
        let (cache, clock) = cache(1_000);
        let compressor = CountingCompressor { calls: AtomicUsize::new(0), fail: false };

        cache.get_or_compress(&compressor, "p1.png", 80).await.unwrap();
        clock.advance(1);
        cache.get_or_compress(&compressor, "p2.png", 80).await.unwrap();

        assert!(!cache.handle().has(&ImageCache::key("p1.png", 80)).await);
        assert!(cache.handle().has(&ImageCache::key("p2.png", 80)).await);
    }

    #[tokio::test]
    async fn test_failed_compression_not_cached() {
        let (cache, _) = cache(10_000);
        let compressor = CountingCompressor { calls: AtomicUsize::new(0), fail: true };

        assert!(cache.get_or_compress(&compressor, "p1.png", 80).await.is_err());
        assert!(cache.get_or_compress(&compressor, "p1.png", 80).await.is_err());
        assert_eq!(compressor.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().await.total_entries, 0);
    }
}
