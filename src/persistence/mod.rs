//! Persistence Module
//!
//! Saves and restores the project and user settings through a
//! [`KeyValueStore`], upgrading old project payloads on load.

mod schema;
mod store;

use tracing::{info, warn};

use crate::document::TranslationProject;
use crate::error::Result;

pub use schema::{migrate_project, unwrap_envelope, wrap_envelope, SchemaVersion, Settings};
pub use store::{FileStore, KeyValueStore, MemoryStore};

pub const PROJECT_KEY: &str = "manga-overlay:project";
pub const SETTINGS_KEY: &str = "manga-overlay:settings";

pub async fn save_project(store: &dyn KeyValueStore, project: &TranslationProject) -> Result<()> {
    store.set(PROJECT_KEY, wrap_envelope(project)?).await
}

/// Loads the saved project, migrating it to the current schema.
pub async fn load_project(store: &dyn KeyValueStore) -> Result<Option<TranslationProject>> {
    let Some(raw) = store.get(PROJECT_KEY).await? else {
        return Ok(None);
    };
    let (version, data) = unwrap_envelope(&raw)?;
    if version < SchemaVersion::CURRENT {
        info!(from = version.number(), to = SchemaVersion::CURRENT.number(), "migrating saved project");
    }
    let data = migrate_project(data, version)?;
    Ok(Some(serde_json::from_value(data)?))
}

pub async fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> Result<()> {
    store.set(SETTINGS_KEY, wrap_envelope(settings)?).await
}

/// Loads saved settings, or defaults when none were saved.
pub async fn load_settings(store: &dyn KeyValueStore) -> Result<Settings> {
    let Some(raw) = store.get(SETTINGS_KEY).await? else {
        return Ok(Settings::default());
    };
    let (_, data) = unwrap_envelope(&raw)?;
    Ok(serde_json::from_value(data)?)
}

/// Key an unreadable payload is copied to before `key` is written again.
pub fn backup_key(key: &str) -> String {
    format!("{}:unreadable", key)
}

/// Copies the raw payload under `key` to [`backup_key`]. Returns the backup
/// key, or None when nothing is stored under `key`.
pub async fn back_up_raw(store: &dyn KeyValueStore, key: &str) -> Result<Option<String>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    let backup = backup_key(key);
    store.set(&backup, raw).await?;
    warn!(key, backup = %backup, "saved payload could not be read, kept a copy");
    Ok(Some(backup))
}
