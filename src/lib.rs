//! Manga Overlay - translation overlay service core
//!
//! Caches expensive OCR, translation and image work behind bounded LRU+TTL
//! caches, and keeps an undoable document of translated text boxes.

pub mod api;
pub mod cache;
pub mod caches;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod history;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use context::{AppContext, CacheRequest, CachedValue, Collaborators};
pub use error::{AppError, Result};
