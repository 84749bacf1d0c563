//! Translation Cache
//!
//! Translated text keyed by language pair and source text.

use std::future::Future;
use std::sync::Arc;

use crate::cache::{CacheConfig, CacheHandle, CacheStats, Clock};
use crate::collaborators::{ProviderChain, Translation, TranslationError};

#[derive(Debug)]
pub struct TranslationCache {
    inner: CacheHandle<Translation>,
}

impl TranslationCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: CacheHandle::new("translation", config),
        }
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: CacheHandle::with_clock("translation", config, clock),
        }
    }

    /// `from-to-text`
    pub fn key(text: &str, from: &str, to: &str) -> String {
        format!("{}-{}-{}", from, to, text)
    }

    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<Translation, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Translation, E>>,
    {
        self.inner.get_or_compute(key, compute).await
    }

    pub async fn get_or_translate(
        &self,
        chain: &ProviderChain,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslationError> {
        let key = Self::key(text, from, to);
        self.get_or_compute(&key, || chain.translate(text, from, to))
            .await
    }

    pub fn handle(&self) -> &CacheHandle<Translation> {
        &self.inner
    }

    pub fn handle_mut(&mut self) -> &mut CacheHandle<Translation> {
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
    use crate::collaborators::{OfflineDictionary, TranslationProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EchoProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranslationProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn translate(&self, text: &str, _from: &str, to: &str) -> Result<String, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}] {}", to, text))
        }
    }

    fn cache() -> TranslationCache {
        TranslationCache::new(CacheConfig::new(10_000, Duration::from_secs(60)))
    }

    #[test]
    fn test_key_format() {
        assert_eq!(TranslationCache::key("こんにちは", "ja", "en"), "ja-en-こんにちは");
    }

    #[tokio::test]
    async fn test_translation_cached_per_pair() {
        let echo = Arc::new(EchoProvider { calls: AtomicUsize::new(0) });
        let chain = ProviderChain::new(vec![echo.clone()], OfflineDictionary::new());
        let cache = cache();

        let first = cache.get_or_translate(&chain, "hola", "es", "en").await.unwrap();
        let second = cache.get_or_translate(&chain, "hola", "es", "en").await.unwrap();
        let other = cache.get_or_translate(&chain, "hola", "es", "fr").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.text, "[en] hola");
        assert_eq!(other.text, "[fr] hola");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_provider_error_propagates_and_is_not_cached() {
        let cache = cache();
        let key = TranslationCache::key("x", "ja", "en");

        let result = cache
            .get_or_compute(&key, || async { Err(TranslationError::AllProvidersFailed) })
            .await;

        assert_eq!(result, Err(TranslationError::AllProvidersFailed));
        assert!(!cache.handle().has(&key).await);
    }
}
