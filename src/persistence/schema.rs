//! Persisted Schema
//!
//! Stored values are wrapped as `{"version": N, "data": ...}`. Older project
//! payloads are upgraded one version at a time before deserialising.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaVersion {
    /// Text boxes carry a single `text` field
    V1 = 1,
    /// `text` split into `original_text` and `translated_text`
    V2 = 2,
    /// Per-box `confidence` and `language`
    V3 = 3,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V3;

    pub fn from_number(n: u64) -> Option<Self> {
        match n {
            1 => Some(SchemaVersion::V1),
            2 => Some(SchemaVersion::V2),
            3 => Some(SchemaVersion::V3),
            _ => None,
        }
    }

    pub fn number(self) -> u64 {
        self as u64
    }

    fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }
}

// == Envelope ==
pub fn wrap_envelope<T: Serialize>(data: &T) -> Result<String> {
    let envelope = json!({
        "version": SchemaVersion::CURRENT.number(),
        "data": serde_json::to_value(data)?,
    });
    Ok(serde_json::to_string(&envelope)?)
}

/// Splits a stored payload into its version and data. Payloads without an
/// envelope predate versioning and are treated as V1.
pub fn unwrap_envelope(raw: &str) -> Result<(SchemaVersion, Value)> {
    let value: Value = serde_json::from_str(raw)?;
    let (Some(version), Some(_)) = (value.get("version"), value.get("data")) else {
        return Ok((SchemaVersion::V1, value));
    };
    let number = version
        .as_u64()
        .ok_or_else(|| AppError::Persistence(format!("invalid schema version {}", version)))?;
    let version = SchemaVersion::from_number(number).ok_or_else(|| {
        AppError::Persistence(format!(
            "schema version {} is newer than supported version {}",
            number,
            SchemaVersion::CURRENT.number()
        ))
    })?;
    let data = match value {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    };
    Ok((version, data))
}

// == Project Migrations ==
/// Upgrades a project payload from `from` to the current version.
pub fn migrate_project(mut project: Value, from: SchemaVersion) -> Result<Value> {
    let mut version = from;
    while let Some(next) = version.next() {
        project = match next {
            SchemaVersion::V2 => v1_to_v2(project)?,
            SchemaVersion::V3 => v2_to_v3(project)?,
            SchemaVersion::V1 => project,
        };
        version = next;
    }
    Ok(project)
}

fn v1_to_v2(mut project: Value) -> Result<Value> {
    for text_box in text_boxes_mut(&mut project)? {
        let text = text_box.remove("text").unwrap_or_else(|| json!(""));
        text_box.entry("original_text").or_insert(text);
        text_box.entry("translated_text").or_insert_with(|| json!(""));
    }
    Ok(project)
}

fn v2_to_v3(mut project: Value) -> Result<Value> {
    let language = json!({
        "from": project.get("source_language").cloned().unwrap_or_else(|| json!("ja")),
        "to": project.get("target_language").cloned().unwrap_or_else(|| json!("en")),
    });
    for text_box in text_boxes_mut(&mut project)? {
        text_box.entry("confidence").or_insert_with(|| json!(1.0));
        text_box
            .entry("language")
            .or_insert_with(|| language.clone());
    }
    Ok(project)
}

fn text_boxes_mut(project: &mut Value) -> Result<Vec<&mut Map<String, Value>>> {
    let pages = project
        .get_mut("pages")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| AppError::Persistence("project has no pages array".to_string()))?;

    let mut boxes = Vec::new();
    for page in pages {
        if let Some(list) = page.get_mut("text_boxes").and_then(Value::as_array_mut) {
            boxes.extend(list.iter_mut().filter_map(Value::as_object_mut));
        }
    }
    Ok(boxes)
}

// == Settings ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source_language: String,
    pub target_language: String,
    /// Translation provider names in the order they are tried
    pub provider_order: Vec<String>,
    /// Image compression quality from 1 to 100
    pub image_quality: u8,
    pub auto_translate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_language: "ja".to_string(),
            target_language: "en".to_string(),
            provider_order: Vec::new(),
            image_quality: 80,
            auto_translate: true,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Option<String> {
        if self.source_language.trim().is_empty() || self.target_language.trim().is_empty() {
            return Some("Languages cannot be empty".to_string());
        }
        if !(1..=100).contains(&self.image_quality) {
            return Some(format!("image_quality must be within 1..=100, got {}", self.image_quality));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_project() -> Value {
        json!({
            "id": "6f0c1a8e-64d6-4c43-9a8f-0f7f2d1b7a10",
            "name": "Old",
            "source_language": "ja",
            "target_language": "fr",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "pages": [{
                "id": "0d6bb8b7-5a6e-4d35-9a43-3e40a6d6c9b1",
                "image_url": "p1.png",
                "width": 800,
                "height": 1200,
                "text_boxes": [{
                    "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
                    "x": 0.1, "y": 0.1, "width": 0.2, "height": 0.2,
                    "text": "こんにちは"
                }]
            }]
        })
    }

    #[test]
    fn test_migrate_v1_to_current() {
        let migrated = migrate_project(v1_project(), SchemaVersion::V1).unwrap();
        let text_box = &migrated["pages"][0]["text_boxes"][0];

        assert_eq!(text_box["original_text"], "こんにちは");
        assert_eq!(text_box["translated_text"], "");
        assert!(text_box.get("text").is_none());
        assert_eq!(text_box["confidence"], 1.0);
        assert_eq!(text_box["language"], json!({"from": "ja", "to": "fr"}));
    }

    #[test]
    fn test_v2_to_v3_keeps_existing_fields() {
        let mut project = v1_project();
        project["pages"][0]["text_boxes"][0] = json!({
            "original_text": "a", "translated_text": "b", "confidence": 0.4
        });
        let migrated = migrate_project(project, SchemaVersion::V2).unwrap();
        let text_box = &migrated["pages"][0]["text_boxes"][0];

        assert_eq!(text_box["confidence"], 0.4);
        assert_eq!(text_box["translated_text"], "b");
    }

    #[test]
    fn test_current_version_is_untouched() {
        let project = v1_project();
        assert_eq!(migrate_project(project.clone(), SchemaVersion::V3).unwrap(), project);
    }

    #[test]
    fn test_unwrap_envelope() {
        let raw = wrap_envelope(&json!({"k": 1})).unwrap();
        let (version, data) = unwrap_envelope(&raw).unwrap();
        assert_eq!(version, SchemaVersion::CURRENT);
        assert_eq!(data, json!({"k": 1}));

        let (version, _) = unwrap_envelope(&v1_project().to_string()).unwrap();
        assert_eq!(version, SchemaVersion::V1);
    }

    #[test]
    fn test_unwrap_future_version_fails() {
        let raw = json!({"version": 99, "data": {}}).to_string();
        assert!(matches!(unwrap_envelope(&raw), Err(AppError::Persistence(_))));
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: Settings = serde_json::from_value(json!({"target_language": "de"})).unwrap();
        assert_eq!(settings.target_language, "de");
        assert_eq!(settings.image_quality, 80);
        assert!(settings.validate().is_none());

        let bad = Settings { image_quality: 0, ..Settings::default() };
        assert!(bad.validate().is_some());
    }
}
