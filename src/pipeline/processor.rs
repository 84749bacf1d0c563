//! Page Processor
//!
//! OCR, bubble grouping and translation for one page, every external call
//! going through its cache under a deadline.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::caches::{ImageCache, OcrCache, TranslationCache};
use crate::collaborators::{
    with_timeout, BubbleDetector, CompressedImage, ImageCompressor, OcrEngine, ProviderChain,
};
use crate::document::{LanguagePair, MangaPage, TextBox};
use crate::error::{AppError, Result};

use super::grouping::group_lines;

/// A box-level step that failed without stopping the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    /// Position of the group on the page
    pub index: usize,
    pub stage: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageOutcome {
    pub page_id: Uuid,
    pub boxes: Vec<TextBox>,
    pub failures: Vec<ItemFailure>,
}

/// Per-page entry of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageResult {
    Processed(PageOutcome),
    Failed { page_id: Uuid, error: String },
}

impl PageResult {
    pub fn page_id(&self) -> Uuid {
        match self {
            PageResult::Processed(outcome) => outcome.page_id,
            PageResult::Failed { page_id, .. } => *page_id,
        }
    }

    pub fn failed(page_id: Uuid, err: &AppError) -> Self {
        PageResult::Failed {
            page_id,
            error: err.to_string(),
        }
    }
}

/// Borrowed view over the caches and collaborators a run needs.
pub struct PageProcessor<'a> {
    pub images: &'a ImageCache,
    pub ocr: &'a OcrCache,
    pub translations: &'a TranslationCache,
    pub ocr_engine: &'a dyn OcrEngine,
    pub detector: &'a dyn BubbleDetector,
    pub compressor: &'a dyn ImageCompressor,
    pub chain: &'a ProviderChain,
    pub timeout: Duration,
    /// When false, boxes keep an empty translation
    pub translate: bool,
}

impl<'a> PageProcessor<'a> {
    pub async fn compressed_image(&self, url: &str, quality: u8) -> Result<CompressedImage> {
        with_timeout(
            self.timeout,
            "image compression",
            self.images.get_or_compress(self.compressor, url, quality),
        )
        .await
    }

    /// Recognises, groups and translates one page.
    ///
    /// Fails only when OCR itself fails; detector errors fall back to one
    /// box per OCR line and translation errors are reported per box.
    pub async fn process_page(
        &self,
        page: &MangaPage,
        languages: &[String],
        pair: &LanguagePair,
    ) -> Result<PageOutcome> {
        let ocr = with_timeout(
            self.timeout,
            "ocr",
            self.ocr.get_or_recognize(self.ocr_engine, &page.image_url, languages),
        )
        .await?;

        let regions = match with_timeout(
            self.timeout,
            "bubble detection",
            self.detector.detect_regions(&page.image_url),
        )
        .await
        {
            Ok(regions) => regions,
            Err(err) => {
                warn!(page = %page.id, error = %err, "bubble detection unavailable, using OCR lines");
                Vec::new()
            }
        };

        let (width, height) = if ocr.image_width > 0 && ocr.image_height > 0 {
            (ocr.image_width, ocr.image_height)
        } else {
            (page.width, page.height)
        };

        let mut outcome = PageOutcome {
            page_id: page.id,
            boxes: Vec::new(),
            failures: Vec::new(),
        };

        for (index, group) in group_lines(&ocr.lines, &regions).into_iter().enumerate() {
            let Some((x, y, w, h)) = group.bbox.to_unit(width, height) else {
                outcome.failures.push(ItemFailure {
                    index,
                    stage: "geometry",
                    message: "image has zero size".to_string(),
                });
                continue;
            };
            let mut text_box = TextBox::new(x, y, w, h, group.text)
                .with_language(pair.clone())
                .with_confidence(group.confidence);
            if let Some(msg) = text_box.validate() {
                outcome.failures.push(ItemFailure {
                    index,
                    stage: "geometry",
                    message: msg,
                });
                continue;
            }

            if !self.translate {
                outcome.boxes.push(text_box);
                continue;
            }
            match with_timeout(
                self.timeout,
                "translation",
                self.translations.get_or_translate(
                    self.chain,
                    &text_box.original_text,
                    &pair.from,
                    &pair.to,
                ),
            )
            .await
            {
                Ok(translation) => text_box.translated_text = translation.text,
                Err(err) => outcome.failures.push(ItemFailure {
                    index,
                    stage: "translation",
                    message: err.to_string(),
                }),
            }
            outcome.boxes.push(text_box);
        }

        info!(
            page = %page.id,
            boxes = outcome.boxes.len(),
            failures = outcome.failures.len(),
            "page processed"
        );
        Ok(outcome)
    }

    /// Processes pages in order. A failed page is reported in place.
    pub async fn process_batch(
        &self,
        pages: &[MangaPage],
        languages: &[String],
        pair: &LanguagePair,
    ) -> Vec<Result<PageOutcome>> {
        let mut results = Vec::with_capacity(pages.len());
        for page in pages {
            let result = self.process_page(page, languages, pair).await;
            if let Err(err) = &result {
                debug!(page = %page.id, error = %err, "page failed, continuing batch");
            }
            results.push(result);
        }
        results
    }
}
