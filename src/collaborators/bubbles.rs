//! Bubble Detector
//!
//! Contract for the computer-vision routine that finds speech bubbles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::BoundingBox;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// The vision runtime has not finished loading
    #[error("bubble detector not ready: {0}")]
    RuntimeNotReady(String),

    #[error("bubble detection failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleKind {
    Speech,
    Thought,
    Narration,
    Effect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    pub bbox: BoundingBox,
    /// Detector confidence in `[0, 1]`
    pub confidence: f32,
    pub kind: BubbleKind,
}

#[async_trait]
pub trait BubbleDetector: Send + Sync {
    async fn detect_regions(&self, image_source: &str) -> Result<Vec<DetectedRegion>, DetectionError>;
}

/// Detector used when no vision runtime is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledDetector;

#[async_trait]
impl BubbleDetector for DisabledDetector {
    async fn detect_regions(&self, _image_source: &str) -> Result<Vec<DetectedRegion>, DetectionError> {
        Err(DetectionError::RuntimeNotReady(
            "no bubble detector configured".to_string(),
        ))
    }
}
