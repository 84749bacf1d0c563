//! Translation Providers
//!
//! Providers share one capability trait. The chain tries them in its listed
//! order and always ends in the offline dictionary, which does no I/O and
//! never fails.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("{provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("{provider} does not support {from} -> {to}")]
    UnsupportedPair {
        provider: String,
        from: String,
        to: String,
    },

    #[error("every translation provider failed")]
    AllProvidersFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    /// Name of the provider that produced the text
    pub provider: String,
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, TranslationError>;
}

// == Provider Chain ==
/// Ordered fallback list of providers.
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn TranslationProvider>>,
    offline: Arc<OfflineDictionary>,
}

impl ProviderChain {
    /// Builds a chain that tries `providers` in order, then `offline`.
    pub fn new(providers: Vec<Arc<dyn TranslationProvider>>, offline: OfflineDictionary) -> Self {
        Self {
            providers,
            offline: Arc::new(offline),
        }
    }

    /// A chain with only the built-in offline dictionary.
    pub fn offline_only() -> Self {
        Self::new(Vec::new(), OfflineDictionary::builtin())
    }

    /// Provider names in the order they are tried.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|p| p.name().to_string())
            .chain(std::iter::once(self.offline.name().to_string()))
            .collect()
    }

    /// Reorders the online providers to follow `order` (names not listed keep
    /// their relative order after the listed ones).
    pub fn reordered(mut self, order: &[String]) -> Self {
        self.providers.sort_by_key(|p| {
            order
                .iter()
                .position(|name| name == p.name())
                .unwrap_or(usize::MAX)
        });
        self
    }

    pub async fn translate(&self, text: &str, from: &str, to: &str) -> Result<Translation, TranslationError> {
        if text.trim().is_empty() {
            return Ok(Translation {
                text: String::new(),
                provider: self.offline.name().to_string(),
            });
        }

        for provider in &self.providers {
            match provider.translate(text, from, to).await {
                Ok(translated) => {
                    debug!(provider = provider.name(), "translation succeeded");
                    return Ok(Translation {
                        text: translated,
                        provider: provider.name().to_string(),
                    });
                }
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "translation provider failed, falling through");
                }
            }
        }

        let text = self.offline.translate(text, from, to).await?;
        Ok(Translation {
            text,
            provider: self.offline.name().to_string(),
        })
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("providers", &self.provider_names())
            .finish()
    }
}

// == Offline Dictionary ==
/// Phrase table lookup per language pair.
///
/// The whole text is looked up first. Otherwise the text is scanned left to
/// right, replacing the longest known phrase at each position; unknown runs
/// are kept verbatim. Translated segments are joined with single spaces.
#[derive(Debug, Clone, Default)]
pub struct OfflineDictionary {
    /// Per pair, phrases sorted longest first
    entries: HashMap<(String, String), Vec<(String, String)>>,
}

impl OfflineDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary with a small set of common Japanese manga phrases.
    pub fn builtin() -> Self {
        let mut dict = Self::new();
        let ja_en = [
            ("ありがとう", "Thank you"),
            ("すみません", "Excuse me"),
            ("ごめんなさい", "I'm sorry"),
            ("ごめん", "Sorry"),
            ("こんにちは", "Hello"),
            ("おはよう", "Good morning"),
            ("大丈夫", "It's okay"),
            ("待って", "Wait"),
            ("行くぞ", "Let's go"),
            ("本当", "Really"),
            ("先輩", "Senpai"),
            ("はい", "Yes"),
            ("いいえ", "No"),
            ("なに", "What"),
            ("何", "What"),
            ("よし", "Alright"),
            ("！", "!"),
            ("？", "?"),
        ];
        for (source, target) in ja_en {
            dict.insert("ja", "en", source, target);
        }
        dict
    }

    /// Adds or replaces a phrase. Blank phrases are ignored since they would
    /// match at every position.
    pub fn insert(&mut self, from: &str, to: &str, source: &str, target: &str) {
        if source.trim().is_empty() {
            warn!(from, to, "ignoring blank dictionary phrase");
            return;
        }
        let phrases = self
            .entries
            .entry((from.to_string(), to.to_string()))
            .or_default();
        phrases.retain(|(s, _)| s != source);
        phrases.push((source.to_string(), target.to_string()));
        phrases.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()).then(a.0.cmp(&b.0)));
    }

    /// Deterministic lookup. Text with no known phrase comes back unchanged.
    pub fn lookup(&self, text: &str, from: &str, to: &str) -> String {
        let Some(phrases) = self.entries.get(&(from.to_string(), to.to_string())) else {
            return text.to_string();
        };
        let trimmed = text.trim();
        if let Some((_, target)) = phrases.iter().find(|(source, _)| source == trimmed) {
            return target.clone();
        }

        let mut segments: Vec<String> = Vec::new();
        let mut unknown = String::new();
        let mut rest = trimmed;
        while let Some(c) = rest.chars().next() {
            match phrases.iter().find(|(source, _)| rest.starts_with(source.as_str())) {
                Some((source, target)) => {
                    flush(&mut unknown, &mut segments);
                    segments.push(target.clone());
                    rest = &rest[source.len()..];
                }
                None => {
                    unknown.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        flush(&mut unknown, &mut segments);

        let mut out = String::new();
        for segment in segments {
            let punctuation = matches!(segment.as_str(), "!" | "?" | "." | ",");
            if !out.is_empty() && !punctuation {
                out.push(' ');
            }
            out.push_str(&segment);
        }
        out
    }
}

fn flush(unknown: &mut String, segments: &mut Vec<String>) {
    let trimmed = unknown.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
    unknown.clear();
}

#[async_trait]
impl TranslationProvider for OfflineDictionary {
    fn name(&self) -> &str {
        "offline-dictionary"
    }

    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, TranslationError> {
        Ok(self.lookup(text, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        name: &'static str,
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(name: &'static str, reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TranslationProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn translate(&self, _text: &str, _from: &str, _to: &str) -> Result<String, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(str::to_string)
                .ok_or_else(|| TranslationError::Provider {
                    provider: self.name.to_string(),
                    message: "quota exceeded".to_string(),
                })
        }
    }

    #[test]
    fn test_dictionary_exact_phrase() {
        let dict = OfflineDictionary::builtin();
        assert_eq!(dict.lookup("ありがとう", "ja", "en"), "Thank you");
        assert_eq!(dict.lookup("  ありがとう ", "ja", "en"), "Thank you");
    }

    #[test]
    fn test_dictionary_longest_match_segments() {
        let dict = OfflineDictionary::builtin();
        assert_eq!(dict.lookup("ごめんなさい先輩！", "ja", "en"), "I'm sorry Senpai!");
        assert_eq!(dict.lookup("はい先輩", "ja", "en"), "Yes Senpai");
    }

    #[test]
    fn test_dictionary_unknown_pair_passes_through() {
        let dict = OfflineDictionary::builtin();
        assert_eq!(dict.lookup("bonjour", "fr", "en"), "bonjour");
    }

    #[test]
    fn test_dictionary_insert_replaces() {
        let mut dict = OfflineDictionary::new();
        dict.insert("en", "es", "hello", "hola");
        dict.insert("en", "es", "hello", "buenas");
        assert_eq!(dict.lookup("hello", "en", "es"), "buenas");
    }

    #[test]
    fn test_dictionary_ignores_blank_phrases() {
        let mut dict = OfflineDictionary::new();
        dict.insert("ja", "en", "", "x");
        dict.insert("ja", "en", "  ", "y");
        dict.insert("ja", "en", "はい", "Yes");

        assert_eq!(dict.lookup("abc", "ja", "en"), "abc");
        assert_eq!(dict.lookup("はいabc", "ja", "en"), "Yes abc");
    }

    #[tokio::test]
    async fn test_chain_uses_first_successful_provider() {
        let failing = FixedProvider::new("cloud-a", None);
        let working = FixedProvider::new("cloud-b", Some("Hello there"));
        let chain = ProviderChain::new(
            vec![failing.clone(), working.clone()],
            OfflineDictionary::builtin(),
        );

        let result = chain.translate("こんにちは", "ja", "en").await.unwrap();
        assert_eq!(result.text, "Hello there");
        assert_eq!(result.provider, "cloud-b");
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chain_falls_back_to_dictionary() {
        let failing = FixedProvider::new("cloud-a", None);
        let chain = ProviderChain::new(vec![failing], OfflineDictionary::builtin());

        let result = chain.translate("こんにちは", "ja", "en").await.unwrap();
        assert_eq!(result.text, "Hello");
        assert_eq!(result.provider, "offline-dictionary");
    }

    #[tokio::test]
    async fn test_chain_skips_blank_text() {
        let provider = FixedProvider::new("cloud-a", Some("x"));
        let chain = ProviderChain::new(vec![provider.clone()], OfflineDictionary::new());

        let result = chain.translate("   ", "ja", "en").await.unwrap();
        assert_eq!(result.text, "");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_chain_reordered() {
        let a = FixedProvider::new("a", None);
        let b = FixedProvider::new("b", None);
        let chain = ProviderChain::new(vec![a, b], OfflineDictionary::new())
            .reordered(&["b".to_string()]);

        assert_eq!(chain.provider_names(), vec!["b", "a", "offline-dictionary"]);
    }
}
