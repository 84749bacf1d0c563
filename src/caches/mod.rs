//! Specialized Caches
//!
//! Each cache fronts one costly external operation with its own key rule,
//! byte budget and TTL.
//!
//! | Cache | Key | Budget | TTL |
//! |---|---|---|---|
//! | [`ImageCache`] | `url-quality` | 200 MiB | 2 h |
//! | [`TranslationCache`] | `from-to-text` | 10 MiB | 7 days |
//! | [`OcrCache`] | digest of `(url, language)` | 50 MiB | 24 h |

mod image;
mod ocr;
mod translation;

use std::time::Duration;

use crate::cache::{CacheConfig, MIB};

pub use image::ImageCache;
pub use ocr::OcrCache;
pub use translation::TranslationCache;

pub const IMAGE_CACHE_MAX_BYTES: usize = 200 * MIB;
pub const IMAGE_CACHE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

pub const TRANSLATION_CACHE_MAX_BYTES: usize = 10 * MIB;
pub const TRANSLATION_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub const OCR_CACHE_MAX_BYTES: usize = 50 * MIB;
pub const OCR_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub fn default_image_config() -> CacheConfig {
    CacheConfig::new(IMAGE_CACHE_MAX_BYTES, IMAGE_CACHE_TTL)
}

pub fn default_translation_config() -> CacheConfig {
    CacheConfig::new(TRANSLATION_CACHE_MAX_BYTES, TRANSLATION_CACHE_TTL)
}

pub fn default_ocr_config() -> CacheConfig {
    CacheConfig::new(OCR_CACHE_MAX_BYTES, OCR_CACHE_TTL)
}
