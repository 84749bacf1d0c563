//! Text Box Patches
//!
//! Partial updates to a [`TextBox`]. A patch doubles as the partial snapshot
//! stored in edit history: the "before" patch of an edit holds the previous
//! values of exactly the fields the edit changed.

use serde::{Deserialize, Serialize};

use crate::document::{LanguagePair, TextBox, TextStyle};
use crate::history::ActionKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBoxPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguagePair>,
}

impl TextBoxPatch {
    /// Patch that moves a box.
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that resizes a box.
    pub fn resized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Patch that replaces the translated text.
    pub fn translated(text: impl Into<String>) -> Self {
        Self {
            translated_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn touches_position(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    fn touches_size(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    fn touches_content(&self) -> bool {
        self.original_text.is_some()
            || self.translated_text.is_some()
            || self.style.is_some()
            || self.confidence.is_some()
            || self.language.is_some()
    }

    /// Classifies the edit: geometry-only changes are moves or resizes,
    /// anything touching content is an edit.
    pub fn kind(&self) -> ActionKind {
        if self.touches_content() {
            ActionKind::Edit
        } else if self.touches_size() {
            ActionKind::Resize
        } else if self.touches_position() {
            ActionKind::Move
        } else {
            ActionKind::Edit
        }
    }

    /// Validates the patch. Returns an error message if invalid, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.is_empty() {
            return Some("Patch does not change any field".to_string());
        }
        for (name, value) in [("x", self.x), ("y", self.y)] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Some(format!("{} must be within [0, 1], got {}", name, v));
                }
            }
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value {
                if !(v > 0.0 && v <= 1.0) {
                    return Some(format!("{} must be within (0, 1], got {}", name, v));
                }
            }
        }
        if let Some(c) = self.confidence {
            if !(0.0..=1.0).contains(&c) {
                return Some(format!("confidence must be within [0, 1], got {}", c));
            }
        }
        None
    }

    /// Captures the current values of the fields this patch would change.
    pub fn capture(&self, text_box: &TextBox) -> Self {
        Self {
            x: self.x.map(|_| text_box.x),
            y: self.y.map(|_| text_box.y),
            width: self.width.map(|_| text_box.width),
            height: self.height.map(|_| text_box.height),
            original_text: self
                .original_text
                .as_ref()
                .map(|_| text_box.original_text.clone()),
            translated_text: self
                .translated_text
                .as_ref()
                .map(|_| text_box.translated_text.clone()),
            style: self.style.as_ref().map(|_| text_box.style.clone()),
            confidence: self.confidence.map(|_| text_box.confidence),
            language: self.language.as_ref().map(|_| text_box.language.clone()),
        }
    }

    /// Writes every set field onto `text_box`.
    pub fn apply_to(&self, text_box: &mut TextBox) {
        if let Some(x) = self.x {
            text_box.x = x;
        }
        if let Some(y) = self.y {
            text_box.y = y;
        }
        if let Some(width) = self.width {
            text_box.width = width;
        }
        if let Some(height) = self.height {
            text_box.height = height;
        }
        if let Some(text) = &self.original_text {
            text_box.original_text = text.clone();
        }
        if let Some(text) = &self.translated_text {
            text_box.translated_text = text.clone();
        }
        if let Some(style) = &self.style {
            text_box.style = style.clone();
        }
        if let Some(confidence) = self.confidence {
            text_box.confidence = confidence;
        }
        if let Some(language) = &self.language {
            text_box.language = language.clone();
        }
    }
}
