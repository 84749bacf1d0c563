//! API Handlers
//!
//! HTTP request handlers for each overlay endpoint. Handlers only translate
//! between HTTP and [`AppContext`] calls.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::context::{AppContext, CacheRequest};
use crate::document::{MangaPage, TextBoxPatch, TranslationProject};
use crate::error::{AppError, Result};
use crate::models::{
    AddPageRequest, AddTextBoxRequest, CacheFetchResponse, CacheStatsResponse, HealthResponse,
    HistoryResponse, HistoryStepResponse, ProcessPagesRequest,
};
use crate::persistence::Settings;
use crate::pipeline::{PageOutcome, PageResult};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
}

impl AppState {
    /// Creates a new AppState around the given context.
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /project
pub async fn project_handler(State(state): State<AppState>) -> Json<TranslationProject> {
    let document = state.ctx.document();
    let document = document.read().await;
    Json(document.project().clone())
}

/// Handler for POST /pages
pub async fn add_page_handler(
    State(state): State<AppState>,
    Json(req): Json<AddPageRequest>,
) -> Result<(StatusCode, Json<MangaPage>)> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let page = state.ctx.add_page(req.into_page()).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// Handler for POST /pages/:page_id/boxes
pub async fn add_text_box_handler(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
    Json(req): Json<AddTextBoxRequest>,
) -> Result<(StatusCode, Json<HistoryStepResponse>)> {
    let text_box = req.into_text_box(state.ctx.language().await);
    let action = state.ctx.add_text_box(page_id, text_box).await?;
    Ok((StatusCode::CREATED, Json(step_response(&state, Some(action)).await)))
}

/// Handler for PATCH /pages/:page_id/boxes/:box_id
pub async fn edit_text_box_handler(
    State(state): State<AppState>,
    Path((page_id, box_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<TextBoxPatch>,
) -> Result<Json<HistoryStepResponse>> {
    let action = state.ctx.apply_edit(page_id, box_id, patch).await?;
    Ok(Json(step_response(&state, Some(action)).await))
}

/// Handler for DELETE /pages/:page_id/boxes/:box_id
pub async fn delete_text_box_handler(
    State(state): State<AppState>,
    Path((page_id, box_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<HistoryStepResponse>> {
    let action = state.ctx.delete_text_box(page_id, box_id).await?;
    Ok(Json(step_response(&state, Some(action)).await))
}

/// Handler for POST /history/undo
pub async fn undo_handler(State(state): State<AppState>) -> Result<Json<HistoryStepResponse>> {
    let action = state.ctx.undo().await?;
    Ok(Json(step_response(&state, action).await))
}

/// Handler for POST /history/redo
pub async fn redo_handler(State(state): State<AppState>) -> Result<Json<HistoryStepResponse>> {
    let action = state.ctx.redo().await?;
    Ok(Json(step_response(&state, action).await))
}

/// Handler for GET /history
pub async fn history_handler(State(state): State<AppState>) -> Json<HistoryResponse> {
    let document = state.ctx.document();
    let document = document.read().await;
    Json(HistoryResponse::from_engine(document.history()))
}

/// Handler for DELETE /history
pub async fn clear_history_handler(State(state): State<AppState>) -> Json<HistoryResponse> {
    state.ctx.clear_history().await;
    history_handler(State(state)).await
}

async fn step_response(
    state: &AppState,
    action: Option<crate::history::EditAction>,
) -> HistoryStepResponse {
    let document = state.ctx.document();
    let document = document.read().await;
    HistoryStepResponse::new(action, document.history())
}

/// Handler for POST /cache/fetch
pub async fn cache_fetch_handler(
    State(state): State<AppState>,
    Json(req): Json<CacheRequest>,
) -> Result<Json<CacheFetchResponse>> {
    let value = state.ctx.fetch_cached(req).await?;
    Ok(Json(value.into()))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        image: state.ctx.images().stats().await.into(),
        ocr: state.ctx.ocr().stats().await.into(),
        translation: state.ctx.translations().stats().await.into(),
    })
}

/// Handler for POST /pages/:page_id/process
pub async fn process_page_handler(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
) -> Result<Json<PageOutcome>> {
    let outcome = state.ctx.process_page(page_id).await?;
    Ok(Json(outcome))
}

/// Handler for POST /pages/process
pub async fn process_pages_handler(
    State(state): State<AppState>,
    Json(req): Json<ProcessPagesRequest>,
) -> Result<Json<Vec<PageResult>>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }
    Ok(Json(state.ctx.process_pages(&req.page_ids).await))
}

/// Handler for GET /settings
pub async fn get_settings_handler(State(state): State<AppState>) -> Json<Settings> {
    Json(state.ctx.settings().await)
}

/// Handler for PUT /settings
pub async fn put_settings_handler(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>> {
    let saved = state.ctx.update_settings(settings).await?;
    Ok(Json(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::Collaborators;
    use crate::persistence::MemoryStore;

    fn test_state() -> AppState {
        test_state_with_store().0
    }

    fn test_state_with_store() -> (AppState, Arc<MemoryStore>) {
        let config = Config::default();
        let collaborators = Collaborators::local(&config);
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(AppContext::new(config, collaborators, store.clone()));
        (state, store)
    }

    async fn page_with_box(state: &AppState) -> (Uuid, Uuid) {
        let (_, Json(page)) = add_page_handler(
            State(state.clone()),
            Json(AddPageRequest {
                image_url: "p1.png".to_string(),
                width: 800,
                height: 1200,
            }),
        )
        .await
        .unwrap();

        let req: AddTextBoxRequest =
            serde_json::from_str(r#"{"x":0.1,"y":0.1,"width":0.2,"height":0.2,"original_text":"はい"}"#)
                .unwrap();
        let (status, Json(step)) = add_text_box_handler(State(state.clone()), Path(page.id), Json(req))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let action = step.action.unwrap();
        (page.id, action.text_box_id)
    }

    #[tokio::test]
    async fn test_edit_then_undo_redo() {
        let state = test_state();
        let (page_id, box_id) = page_with_box(&state).await;

        let Json(step) = edit_text_box_handler(
            State(state.clone()),
            Path((page_id, box_id)),
            Json(TextBoxPatch::moved(0.4, 0.4)),
        )
        .await
        .unwrap();
        assert_eq!(step.current_index, Some(1));

        let Json(step) = undo_handler(State(state.clone())).await.unwrap();
        assert_eq!(step.current_index, Some(0));
        assert!(step.can_redo);

        let Json(step) = redo_handler(State(state.clone())).await.unwrap();
        assert_eq!(step.current_index, Some(1));
        assert!(!step.can_redo);
    }

    #[tokio::test]
    async fn test_add_and_delete_box_are_saved() {
        let (state, store) = test_state_with_store();
        let (page_id, box_id) = page_with_box(&state).await;

        let saved = crate::persistence::load_project(store.as_ref()).await.unwrap().unwrap();
        assert_eq!(saved.pages[0].text_boxes.len(), 1);

        let Json(step) = delete_text_box_handler(State(state.clone()), Path((page_id, box_id)))
            .await
            .unwrap();
        assert_eq!(step.current_index, Some(1));

        let saved = crate::persistence::load_project(store.as_ref()).await.unwrap().unwrap();
        assert!(saved.pages[0].text_boxes.is_empty());
    }

    #[tokio::test]
    async fn test_undo_on_empty_history() {
        let state = test_state();
        let Json(step) = undo_handler(State(state)).await.unwrap();
        assert!(step.action.is_none());
        assert_eq!(step.current_index, None);
    }

    #[tokio::test]
    async fn test_edit_missing_box() {
        let state = test_state();
        let result = edit_text_box_handler(
            State(state),
            Path((Uuid::new_v4(), Uuid::new_v4())),
            Json(TextBoxPatch::moved(0.1, 0.1)),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_history_handler() {
        let state = test_state();
        page_with_box(&state).await;

        let Json(history) = clear_history_handler(State(state.clone())).await;
        assert!(history.actions.is_empty());
        assert_eq!(history.current_index, None);
    }

    #[tokio::test]
    async fn test_add_page_invalid_request() {
        let state = test_state();
        let result = add_page_handler(
            State(state),
            Json(AddPageRequest {
                image_url: "".to_string(),
                width: 800,
                height: 1200,
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
