//! Pipeline Module
//!
//! Turns a page image into translated text boxes.

mod grouping;
mod processor;

pub use grouping::{group_lines, LineGroup};
pub use processor::{ItemFailure, PageOutcome, PageProcessor, PageResult};
