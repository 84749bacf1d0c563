//! Response DTOs for the overlay API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::collaborators::OcrResult;
use crate::context::CachedValue;
use crate::history::{EditAction, HistoryEngine};

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Result of an edit, undo or redo, with the cursor after it.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryStepResponse {
    /// The action applied or reverted; null when at a history boundary
    pub action: Option<EditAction>,
    pub current_index: Option<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl HistoryStepResponse {
    pub fn new(action: Option<EditAction>, history: &HistoryEngine<EditAction>) -> Self {
        Self {
            action,
            current_index: history.current_index(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
        }
    }
}

/// Response body for GET /history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub actions: Vec<EditAction>,
    /// Index of the last applied action; null when nothing is applied
    pub current_index: Option<usize>,
    pub max_steps: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl HistoryResponse {
    pub fn from_engine(history: &HistoryEngine<EditAction>) -> Self {
        Self {
            actions: history.actions().cloned().collect(),
            current_index: history.current_index(),
            max_steps: history.max_steps(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
        }
    }
}

/// One cache's counters plus derived ratios.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSummary {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Bytes in use over the byte budget
    pub utilization: f64,
}

impl From<CacheStats> for CacheSummary {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            utilization: stats.utilization(),
            stats,
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub image: CacheSummary,
    pub ocr: CacheSummary,
    pub translation: CacheSummary,
}

/// Response body for POST /cache/fetch. Image bytes are not echoed back.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheFetchResponse {
    Image {
        mime_type: String,
        quality: u8,
        size: usize,
    },
    Ocr {
        result: OcrResult,
    },
    Translation {
        text: String,
        provider: String,
    },
}

impl From<CachedValue> for CacheFetchResponse {
    fn from(value: CachedValue) -> Self {
        match value {
            CachedValue::Image(image) => CacheFetchResponse::Image {
                size: image.len(),
                mime_type: image.mime_type,
                quality: image.quality,
            },
            CachedValue::Ocr(result) => CacheFetchResponse::Ocr { result },
            CachedValue::Translation(translation) => CacheFetchResponse::Translation {
                text: translation.text,
                provider: translation.provider,
            },
        }
    }
}
