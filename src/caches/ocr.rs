//! OCR Result Cache
//!
//! Recognition results keyed by a digest of image URL and language set.

use std::future::Future;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::cache::{CacheConfig, CacheHandle, CacheStats, Clock};
use crate::collaborators::{OcrEngine, OcrError, OcrResult};

#[derive(Debug)]
pub struct OcrCache {
    inner: CacheHandle<OcrResult>,
}

impl OcrCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: CacheHandle::new("ocr", config),
        }
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: CacheHandle::with_clock("ocr", config, clock),
        }
    }

    /// `ocr-` followed by the hex SHA-256 of the URL and language, separated
    /// by a unit separator so neither part can bleed into the other.
    pub fn key(image_url: &str, language: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(image_url.as_bytes());
        hasher.update([0x1f]);
        hasher.update(language.as_bytes());
        format!("ocr-{}", hex::encode(hasher.finalize()))
    }

    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<OcrResult, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<OcrResult, E>>,
    {
        self.inner.get_or_compute(key, compute).await
    }

    pub async fn get_or_recognize(
        &self,
        engine: &dyn OcrEngine,
        image_url: &str,
        languages: &[String],
    ) -> Result<OcrResult, OcrError> {
        let key = Self::key(image_url, &languages.join("+"));
        self.get_or_compute(&key, || engine.recognize(image_url, languages))
            .await
    }

    pub fn handle(&self) -> &CacheHandle<OcrResult> {
        &self.inner
    }

    pub fn handle_mut(&mut self) -> &mut CacheHandle<OcrResult> {
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
    use crate::collaborators::{BoundingBox, OcrLine};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeEngine {
        calls: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl OcrEngine for FakeEngine {
        async fn recognize(&self, _image: &str, _languages: &[String]) -> Result<OcrResult, OcrError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(OcrError::Initialization("worker not ready".to_string()));
            }
            Ok(OcrResult {
                lines: vec![OcrLine {
                    text: "なに".to_string(),
                    confidence: 91,
                    bbox: BoundingBox::new(1, 2, 3, 4),
                }],
                image_width: 100,
                image_height: 200,
            })
        }
    }

    fn cache() -> OcrCache {
        OcrCache::new(CacheConfig::new(50_000, Duration::from_secs(86_400)))
    }

    #[test]
    fn test_key_is_stable_digest() {
        let key = OcrCache::key("page.png", "jpn");
        assert!(key.starts_with("ocr-"));
        assert_eq!(key.len(), 4 + 64);
        assert_eq!(key, OcrCache::key("page.png", "jpn"));
        assert_ne!(key, OcrCache::key("page.png", "eng"));
        assert_ne!(OcrCache::key("ab", "c"), OcrCache::key("a", "bc"));
    }

    #[tokio::test]
    async fn test_recognize_once() {
        let engine = FakeEngine { calls: AtomicUsize::new(0), fail_first: false };
        let cache = cache();
        let langs = vec!["jpn".to_string()];

        let first = cache.get_or_recognize(&engine, "page.png", &langs).await.unwrap();
        let second = cache.get_or_recognize(&engine, "page.png", &langs).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_then_success() {
        let engine = FakeEngine { calls: AtomicUsize::new(0), fail_first: true };
        let cache = cache();
        let langs = vec!["jpn".to_string()];

        let err = cache.get_or_recognize(&engine, "page.png", &langs).await;
        assert!(matches!(err, Err(OcrError::Initialization(_))));
        assert!(!cache.handle().has(&OcrCache::key("page.png", "jpn")).await);

        let ok = cache.get_or_recognize(&engine, "page.png", &langs).await.unwrap();
        assert_eq!(ok.lines[0].text, "なに");
        assert!(cache.handle().has(&OcrCache::key("page.png", "jpn")).await);
    }
}
