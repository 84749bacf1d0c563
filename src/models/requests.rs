//! Request DTOs for the overlay API
//!
//! Defines the structure of incoming HTTP request bodies. Text box patches,
//! cache requests and settings are accepted in their domain form.

use serde::Deserialize;
use uuid::Uuid;

use crate::document::{LanguagePair, MangaPage, TextBox, TextStyle};

/// Request body for POST /pages
#[derive(Debug, Clone, Deserialize)]
pub struct AddPageRequest {
    pub image_url: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl AddPageRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.image_url.trim().is_empty() {
            return Some("image_url cannot be empty".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Some("Page dimensions must be positive".to_string());
        }
        None
    }

    pub fn into_page(self) -> MangaPage {
        MangaPage::new(self.image_url, self.width, self.height)
    }
}

/// Request body for POST /pages/:page_id/boxes
#[derive(Debug, Clone, Deserialize)]
pub struct AddTextBoxRequest {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub translated_text: String,
    #[serde(default)]
    pub style: Option<TextStyle>,
}

impl AddTextBoxRequest {
    /// Builds the box in the project's language pair. Geometry is checked
    /// by the document store.
    pub fn into_text_box(self, language: LanguagePair) -> TextBox {
        let mut text_box = TextBox::new(self.x, self.y, self.width, self.height, self.original_text)
            .with_language(language);
        text_box.translated_text = self.translated_text;
        if let Some(style) = self.style {
            text_box.style = style;
        }
        text_box
    }
}

/// Request body for POST /pages/process
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessPagesRequest {
    pub page_ids: Vec<Uuid>,
}

impl ProcessPagesRequest {
    pub fn validate(&self) -> Option<String> {
        if self.page_ids.is_empty() {
            return Some("page_ids cannot be empty".to_string());
        }
        None
    }
}
