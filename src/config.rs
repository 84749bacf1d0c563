//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::caches::{
    IMAGE_CACHE_MAX_BYTES, IMAGE_CACHE_TTL, OCR_CACHE_MAX_BYTES, OCR_CACHE_TTL,
    TRANSLATION_CACHE_MAX_BYTES, TRANSLATION_CACHE_TTL,
};
use crate::history::DEFAULT_MAX_HISTORY_STEPS;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub sweep_interval: u64,
    /// Edit history depth
    pub max_history_steps: usize,
    pub image_cache_max_bytes: usize,
    /// Image cache TTL in seconds
    pub image_cache_ttl: u64,
    pub ocr_cache_max_bytes: usize,
    /// OCR cache TTL in seconds
    pub ocr_cache_ttl: u64,
    pub translation_cache_max_bytes: usize,
    /// Translation cache TTL in seconds
    pub translation_cache_ttl: u64,
    /// Deadline in seconds for each OCR, detection, translation or compression call
    pub external_timeout: u64,
    /// Directory for persisted project and settings
    pub data_dir: PathBuf,
    /// Path or name of the tesseract binary
    pub tesseract_cmd: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `MAX_HISTORY_STEPS` - Undo depth (default: 50)
    /// - `IMAGE_CACHE_MAX_BYTES` / `IMAGE_CACHE_TTL` (default: 200 MiB / 7200)
    /// - `OCR_CACHE_MAX_BYTES` / `OCR_CACHE_TTL` (default: 50 MiB / 86400)
    /// - `TRANSLATION_CACHE_MAX_BYTES` / `TRANSLATION_CACHE_TTL` (default: 10 MiB / 604800)
    /// - `EXTERNAL_TIMEOUT` - External call deadline in seconds (default: 30)
    /// - `DATA_DIR` - Persistence directory (default: ./data)
    /// - `TESSERACT_CMD` - OCR binary (default: tesseract)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            max_history_steps: parse_var("MAX_HISTORY_STEPS").unwrap_or(defaults.max_history_steps),
            image_cache_max_bytes: parse_var("IMAGE_CACHE_MAX_BYTES")
                .unwrap_or(defaults.image_cache_max_bytes),
            image_cache_ttl: parse_var("IMAGE_CACHE_TTL").unwrap_or(defaults.image_cache_ttl),
            ocr_cache_max_bytes: parse_var("OCR_CACHE_MAX_BYTES")
                .unwrap_or(defaults.ocr_cache_max_bytes),
            ocr_cache_ttl: parse_var("OCR_CACHE_TTL").unwrap_or(defaults.ocr_cache_ttl),
            translation_cache_max_bytes: parse_var("TRANSLATION_CACHE_MAX_BYTES")
                .unwrap_or(defaults.translation_cache_max_bytes),
            translation_cache_ttl: parse_var("TRANSLATION_CACHE_TTL")
                .unwrap_or(defaults.translation_cache_ttl),
            external_timeout: parse_var("EXTERNAL_TIMEOUT").unwrap_or(defaults.external_timeout),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            tesseract_cmd: env::var("TESSERACT_CMD").unwrap_or(defaults.tesseract_cmd),
        }
    }

    pub fn image_cache(&self) -> CacheConfig {
        CacheConfig::new(self.image_cache_max_bytes, Duration::from_secs(self.image_cache_ttl))
    }

    pub fn ocr_cache(&self) -> CacheConfig {
        CacheConfig::new(self.ocr_cache_max_bytes, Duration::from_secs(self.ocr_cache_ttl))
    }

    pub fn translation_cache(&self) -> CacheConfig {
        CacheConfig::new(
            self.translation_cache_max_bytes,
            Duration::from_secs(self.translation_cache_ttl),
        )
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sweep_interval: 60,
            max_history_steps: DEFAULT_MAX_HISTORY_STEPS,
            image_cache_max_bytes: IMAGE_CACHE_MAX_BYTES,
            image_cache_ttl: IMAGE_CACHE_TTL.as_secs(),
            ocr_cache_max_bytes: OCR_CACHE_MAX_BYTES,
            ocr_cache_ttl: OCR_CACHE_TTL.as_secs(),
            translation_cache_max_bytes: TRANSLATION_CACHE_MAX_BYTES,
            translation_cache_ttl: TRANSLATION_CACHE_TTL.as_secs(),
            external_timeout: 30,
            data_dir: PathBuf::from("./data"),
            tesseract_cmd: "tesseract".to_string(),
        }
    }
}
