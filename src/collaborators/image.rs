//! Image Compressor
//!
//! Contract for the routine that produces display-sized page images.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressionError {
    #[error("image source unavailable: {0}")]
    Unavailable(String),

    #[error("image compression failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedImage {
    pub mime_type: String,
    /// Quality from 1 to 100
    pub quality: u8,
    pub bytes: Vec<u8>,
}

impl CompressedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(&self, url: &str, quality: u8) -> Result<CompressedImage, CompressionError>;
}

// == Passthrough Compressor ==
/// Reads a local image and returns its bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCompressor;

#[async_trait]
impl ImageCompressor for PassthroughCompressor {
    async fn compress(&self, url: &str, quality: u8) -> Result<CompressedImage, CompressionError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CompressionError::Unavailable(format!("{}: {}", path, e)))?;

        Ok(CompressedImage {
            mime_type: mime_for(Path::new(path)).to_string(),
            quality: quality.clamp(1, 100),
            bytes,
        })
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
