//! Document Store
//!
//! Single owner of the project tree and its edit history. Every undoable
//! mutation goes through here so the history always matches the document.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::{MangaPage, TextBox, TextBoxPatch, TranslationProject};
use crate::error::{AppError, Result};
use crate::history::{ActionKind, EditAction, HistoryEngine, Snapshot};

/// Thread-safe document shared between request handlers
pub type SharedDocument = Arc<RwLock<DocumentStore>>;

#[derive(Debug)]
pub struct DocumentStore {
    project: TranslationProject,
    history: HistoryEngine<EditAction>,
}

impl DocumentStore {
    pub fn new(project: TranslationProject, max_history_steps: usize) -> Self {
        Self {
            project,
            history: HistoryEngine::new(max_history_steps),
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(RwLock::new(self))
    }

    pub fn project(&self) -> &TranslationProject {
        &self.project
    }

    /// Swaps in a different project. History for the old one is dropped.
    pub fn replace_project(&mut self, project: TranslationProject) {
        info!(project = %project.id, pages = project.pages.len(), "project loaded");
        self.project = project;
        self.history.clear_history();
    }

    pub fn page(&self, page_id: Uuid) -> Result<&MangaPage> {
        self.project
            .page(page_id)
            .ok_or_else(|| AppError::NotFound(format!("page {}", page_id)))
    }

    fn page_mut(&mut self, page_id: Uuid) -> Result<&mut MangaPage> {
        self.project
            .page_mut(page_id)
            .ok_or_else(|| AppError::NotFound(format!("page {}", page_id)))
    }

    pub fn add_page(&mut self, page: MangaPage) -> Result<&MangaPage> {
        if self.project.page(page.id).is_some() {
            return Err(AppError::InvalidRequest(format!("page {} already exists", page.id)));
        }
        for text_box in &page.text_boxes {
            if let Some(msg) = text_box.validate() {
                return Err(AppError::InvalidRequest(msg));
            }
        }
        let page_id = page.id;
        self.project.pages.push(page);
        self.project.touch();
        self.page(page_id)
    }

    /// Replaces every box on a page with pipeline output. Not recorded in
    /// history. Recorded actions on this page are dropped since they refer to
    /// boxes that no longer exist.
    pub fn replace_page_boxes(&mut self, page_id: Uuid, boxes: Vec<TextBox>) -> Result<&MangaPage> {
        for text_box in &boxes {
            if let Some(msg) = text_box.validate() {
                return Err(AppError::InvalidRequest(msg));
            }
        }
        let page = self.page_mut(page_id)?;
        page.text_boxes = boxes;
        let dropped = self.history.retain(|action| action.page_id != page_id);
        if dropped > 0 {
            debug!(page = %page_id, dropped, "dropped history for replaced page");
        }
        self.project.touch();
        self.page(page_id)
    }

    // == Undoable Mutations ==
    pub fn apply_edit(
        &mut self,
        page_id: Uuid,
        text_box_id: Uuid,
        patch: TextBoxPatch,
    ) -> Result<EditAction> {
        if let Some(msg) = patch.validate() {
            return Err(AppError::InvalidRequest(msg));
        }
        let text_box = self
            .page_mut(page_id)?
            .text_box_mut(text_box_id)
            .ok_or_else(|| AppError::NotFound(format!("text box {}", text_box_id)))?;

        let before = patch.capture(text_box);
        patch.apply_to(text_box);

        let action = EditAction::new(
            patch.kind(),
            page_id,
            text_box_id,
            Snapshot::Fields { patch: before },
            Snapshot::Fields { patch },
        );
        Ok(self.record(action))
    }

    pub fn add_text_box(&mut self, page_id: Uuid, text_box: TextBox) -> Result<EditAction> {
        if let Some(msg) = text_box.validate() {
            return Err(AppError::InvalidRequest(msg));
        }
        let page = self.page_mut(page_id)?;
        if page.text_box(text_box.id).is_some() {
            return Err(AppError::InvalidRequest(format!(
                "text box {} already exists",
                text_box.id
            )));
        }
        let index = page.text_boxes.len();
        page.text_boxes.push(text_box.clone());

        let action = EditAction::new(
            ActionKind::Add,
            page_id,
            text_box.id,
            Snapshot::Missing,
            Snapshot::Whole { text_box, index },
        );
        Ok(self.record(action))
    }

    pub fn delete_text_box(&mut self, page_id: Uuid, text_box_id: Uuid) -> Result<EditAction> {
        let page = self.page_mut(page_id)?;
        let index = page
            .position_of(text_box_id)
            .ok_or_else(|| AppError::NotFound(format!("text box {}", text_box_id)))?;
        let text_box = page.text_boxes.remove(index);

        let action = EditAction::new(
            ActionKind::Delete,
            page_id,
            text_box_id,
            Snapshot::Whole { text_box, index },
            Snapshot::Missing,
        );
        Ok(self.record(action))
    }

    fn record(&mut self, action: EditAction) -> EditAction {
        debug!(kind = action.kind.as_str(), text_box = %action.text_box_id, "recording edit");
        self.project.touch();
        self.history.add_action(action.clone());
        action
    }

    // == Undo / Redo ==
    /// Reverts the most recent applied action. `Ok(None)` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<Option<EditAction>> {
        let Some(action) = self.history.undo().cloned() else {
            return Ok(None);
        };
        if let Err(err) = self.apply_snapshot(action.page_id, action.text_box_id, &action.before) {
            self.history.redo();
            return Err(err);
        }
        self.project.touch();
        Ok(Some(action))
    }

    /// Re-applies the next undone action. `Ok(None)` at the tip.
    pub fn redo(&mut self) -> Result<Option<EditAction>> {
        let Some(action) = self.history.redo().cloned() else {
            return Ok(None);
        };
        if let Err(err) = self.apply_snapshot(action.page_id, action.text_box_id, &action.after) {
            self.history.undo();
            return Err(err);
        }
        self.project.touch();
        Ok(Some(action))
    }

    fn apply_snapshot(&mut self, page_id: Uuid, text_box_id: Uuid, snapshot: &Snapshot) -> Result<()> {
        let page = self.page_mut(page_id)?;
        match snapshot {
            Snapshot::Missing => {
                page.text_boxes.retain(|b| b.id != text_box_id);
            }
            Snapshot::Fields { patch } => {
                let text_box = page
                    .text_box_mut(text_box_id)
                    .ok_or_else(|| AppError::NotFound(format!("text box {}", text_box_id)))?;
                patch.apply_to(text_box);
            }
            Snapshot::Whole { text_box, index } => match page.position_of(text_box_id) {
                Some(pos) => page.text_boxes[pos] = text_box.clone(),
                None => {
                    let at = (*index).min(page.text_boxes.len());
                    page.text_boxes.insert(at, text_box.clone());
                }
            },
        }
        Ok(())
    }

    pub fn history(&self) -> &HistoryEngine<EditAction> {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear_history();
    }
}
