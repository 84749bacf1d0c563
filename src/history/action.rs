//! Edit Actions
//!
//! Immutable records of document mutations. Undo applies `before`, redo
//! applies `after`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{TextBox, TextBoxPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Resize,
    Edit,
    Add,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::Resize => "resize",
            ActionKind::Edit => "edit",
            ActionKind::Add => "add",
            ActionKind::Delete => "delete",
        }
    }
}

/// State of one text box on one side of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Snapshot {
    /// The box does not exist
    Missing,
    /// Values of the fields the action changed
    Fields { patch: TextBoxPatch },
    /// The complete box and its position in the page's box list
    Whole { text_box: TextBox, index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditAction {
    pub id: Uuid,
    pub kind: ActionKind,
    pub page_id: Uuid,
    pub text_box_id: Uuid,
    pub before: Snapshot,
    pub after: Snapshot,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl EditAction {
    pub fn new(
        kind: ActionKind,
        page_id: Uuid,
        text_box_id: Uuid,
        before: Snapshot,
        after: Snapshot,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            page_id,
            text_box_id,
            before,
            after,
            timestamp: Utc::now(),
            description: describe(kind).to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn describe(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Move => "Move text box",
        ActionKind::Resize => "Resize text box",
        ActionKind::Edit => "Edit text box",
        ActionKind::Add => "Add text box",
        ActionKind::Delete => "Delete text box",
    }
}
