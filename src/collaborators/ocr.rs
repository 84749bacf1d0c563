//! OCR Engine
//!
//! Contract for text recognition plus a `tesseract` CLI implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::BoundingBox;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    /// The engine could not be started or is missing language data
    #[error("OCR engine initialization failed: {0}")]
    Initialization(String),

    /// The engine ran but recognition failed
    #[error("OCR recognition failed: {0}")]
    Recognition(String),
}

/// One recognised line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    /// Confidence from 0 to 100
    pub confidence: u8,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OcrResult {
    pub lines: Vec<OcrLine>,
    pub image_width: u32,
    pub image_height: u32,
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognises text in the image at `image_source` using the given
    /// language codes (e.g. `jpn`, `eng`).
    async fn recognize(&self, image_source: &str, languages: &[String]) -> Result<OcrResult, OcrError>;
}

// == Tesseract Engine ==
/// Runs the `tesseract` command line tool and parses its TSV output.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    page_segmentation_mode: u32,
}

impl TesseractEngine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            // Uniform block of text suits speech bubbles.
            page_segmentation_mode: 6,
        }
    }

    pub fn with_psm(mut self, psm: u32) -> Self {
        self.page_segmentation_mode = psm;
        self
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image_source: &str, languages: &[String]) -> Result<OcrResult, OcrError> {
        let path = image_source.strip_prefix("file://").unwrap_or(image_source);
        let languages = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };

        debug!(path, languages = %languages, "running tesseract");
        let output = Command::new(&self.command)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&languages)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .arg("tsv")
            .output()
            .await
            .map_err(|e| OcrError::Initialization(format!("failed to run {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(stderr.trim().to_string()));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Maps an ISO 639-1 code to tesseract's traineddata name. Unknown codes
/// pass through.
pub fn tesseract_language(code: &str) -> String {
    match code {
        "ja" => "jpn",
        "en" => "eng",
        "zh" | "zh-CN" => "chi_sim",
        "zh-TW" => "chi_tra",
        "ko" => "kor",
        "fr" => "fra",
        "de" => "deu",
        "es" => "spa",
        other => other,
    }
    .to_string()
}

// == TSV Parsing ==
/// Parses tesseract TSV output into lines.
///
/// Level-1 rows carry the page size; level-5 rows are words, grouped into
/// lines by their block/paragraph/line numbers.
pub fn parse_tsv(tsv: &str) -> Result<OcrResult, OcrError> {
    let mut result = OcrResult::default();
    let mut words: BTreeMap<(u32, u32, u32), Vec<(BoundingBox, f32, String)>> = BTreeMap::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let num = |i: usize| cols[i].trim().parse::<u32>().unwrap_or(0);
        let bbox = BoundingBox::new(num(6), num(7), num(8), num(9));

        match cols[0].trim() {
            "1" => {
                result.image_width = bbox.width;
                result.image_height = bbox.height;
            }
            "5" => {
                let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
                let text = cols[11].trim();
                if text.is_empty() || conf < 0.0 {
                    continue;
                }
                words
                    .entry((num(2), num(3), num(4)))
                    .or_default()
                    .push((bbox, conf, text.to_string()));
            }
            _ => {}
        }
    }

    if result.image_width == 0 || result.image_height == 0 {
        return Err(OcrError::Recognition("TSV output has no page row".to_string()));
    }

    for (_, mut line_words) in words {
        line_words.sort_by_key(|(bbox, _, _)| bbox.x);
        let mut bbox = line_words[0].0;
        let mut text = String::new();
        let mut conf_sum = 0.0;
        for (word_bbox, conf, word) in &line_words {
            bbox = bbox.union(word_bbox);
            conf_sum += conf;
            if needs_space(&text, word) {
                text.push(' ');
            }
            text.push_str(word);
        }
        let confidence = (conf_sum / line_words.len() as f32).round().clamp(0.0, 100.0) as u8;
        result.lines.push(OcrLine {
            text,
            confidence,
            bbox,
        });
    }

    Ok(result)
}

/// Words of space-delimited scripts are joined with a space; CJK text is not.
fn needs_space(current: &str, next: &str) -> bool {
    match (current.chars().last(), next.chars().next()) {
        (Some(a), Some(b)) => !(is_cjk(a) || is_cjk(b)),
        _ => false,
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x30FF   // CJK punctuation, hiragana, katakana
        | 0x3400..=0x4DBF // CJK extension A
        | 0x4E00..=0x9FFF // CJK unified ideographs
        | 0xAC00..=0xD7AF // Hangul syllables
        | 0xFF00..=0xFFEF // half/full-width forms
    )
}
