//! Document Model
//!
//! Project → pages → text boxes. Text box geometry is stored as fractions
//! of the page image dimensions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// == Language Pair ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub from: String,
    pub to: String,
}

impl LanguagePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new("ja", "en")
    }
}

// == Text Style ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    /// CSS-style hex colour, e.g. `#000000`
    pub color: String,
    pub background_color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Wild Words".to_string(),
            font_size: 16.0,
            color: "#000000".to_string(),
            background_color: None,
            bold: false,
            italic: false,
            align: TextAlign::Center,
        }
    }
}

// == Text Box ==
/// One overlay region on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub id: Uuid,
    /// Left edge, fraction of image width
    pub x: f64,
    /// Top edge, fraction of image height
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub original_text: String,
    pub translated_text: String,
    #[serde(default)]
    pub style: TextStyle,
    /// Recognition confidence in `[0, 1]`
    pub confidence: f32,
    pub language: LanguagePair,
}

impl TextBox {
    /// Creates a box at the given unit-interval geometry with default style.
    pub fn new(x: f64, y: f64, width: f64, height: f64, original_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width,
            height,
            original_text: original_text.into(),
            translated_text: String::new(),
            style: TextStyle::default(),
            confidence: 1.0,
            language: LanguagePair::default(),
        }
    }

    pub fn with_language(mut self, language: LanguagePair) -> Self {
        self.language = language;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Checks that the geometry lies within the unit square.
    pub fn validate(&self) -> Option<String> {
        for (name, value) in [("x", self.x), ("y", self.y)] {
            if !(0.0..=1.0).contains(&value) {
                return Some(format!("{} must be within [0, 1], got {}", name, value));
            }
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(value > 0.0 && value <= 1.0) {
                return Some(format!("{} must be within (0, 1], got {}", name, value));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Some(format!("confidence must be within [0, 1], got {}", self.confidence));
        }
        None
    }
}

// == Manga Page ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaPage {
    pub id: Uuid,
    pub image_url: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    pub text_boxes: Vec<TextBox>,
}

impl MangaPage {
    pub fn new(image_url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_url: image_url.into(),
            width,
            height,
            text_boxes: Vec::new(),
        }
    }

    pub fn text_box(&self, id: Uuid) -> Option<&TextBox> {
        self.text_boxes.iter().find(|b| b.id == id)
    }

    pub fn text_box_mut(&mut self, id: Uuid) -> Option<&mut TextBox> {
        self.text_boxes.iter_mut().find(|b| b.id == id)
    }

    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.text_boxes.iter().position(|b| b.id == id)
    }
}

// == Translation Project ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationProject {
    pub id: Uuid,
    pub name: String,
    pub source_language: String,
    pub target_language: String,
    pub pages: Vec<MangaPage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranslationProject {
    pub fn new(name: impl Into<String>, language: LanguagePair) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            source_language: language.from,
            target_language: language.to,
            pages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn language(&self) -> LanguagePair {
        LanguagePair::new(&self.source_language, &self.target_language)
    }

    pub fn page(&self, id: Uuid) -> Option<&MangaPage> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn page_mut(&mut self, id: Uuid) -> Option<&mut MangaPage> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
