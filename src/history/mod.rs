//! History Module
//!
//! Undo/redo log over document edits. The engine only orders actions; the
//! document store applies them.

mod action;
mod engine;

#[cfg(test)]
mod property_tests;

pub use action::{ActionKind, EditAction, Snapshot};
pub use engine::HistoryEngine;

/// Default number of actions kept per project
pub const DEFAULT_MAX_HISTORY_STEPS: usize = 50;
