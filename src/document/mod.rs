//! Document Module
//!
//! The translation project tree and the store that edits it.

mod model;
mod patch;
mod store;

pub use model::{LanguagePair, MangaPage, TextAlign, TextBox, TextStyle, TranslationProject};
pub use patch::TextBoxPatch;
pub use store::{DocumentStore, SharedDocument};
