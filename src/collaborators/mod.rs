//! External Collaborators
//!
//! Narrow async contracts for the OCR engine, bubble detector, translation
//! providers and image compressor. Each call returns its own typed error,
//! converted into [`AppError`] at the workflow boundary.

mod bubbles;
mod geometry;
mod image;
mod ocr;
mod translate;

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::cache::duration_ms;
use crate::error::{AppError, Result};

pub use bubbles::{BubbleDetector, BubbleKind, DetectedRegion, DetectionError, DisabledDetector};
pub use geometry::BoundingBox;
pub use image::{CompressedImage, CompressionError, ImageCompressor, PassthroughCompressor};
pub use ocr::{
    parse_tsv, tesseract_language, OcrEngine, OcrError, OcrLine, OcrResult, TesseractEngine,
};
pub use translate::{
    OfflineDictionary, ProviderChain, Translation, TranslationError, TranslationProvider,
};

/// Runs an external call with a deadline.
///
/// On timeout the call is dropped and reported as [`AppError::Timeout`].
pub async fn with_timeout<T, E, F>(limit: Duration, what: &str, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<AppError>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            warn!(call = what, limit_ms = duration_ms(limit), "external call timed out");
            Err(AppError::Timeout(duration_ms(limit), what.to_string()))
        }
    }
}
