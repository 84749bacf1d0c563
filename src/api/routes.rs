//! API Routes
//!
//! Configures the Axum router with all overlay endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_page_handler, add_text_box_handler, cache_fetch_handler, cache_stats_handler,
    clear_history_handler, delete_text_box_handler, edit_text_box_handler, get_settings_handler,
    health_handler, history_handler, process_page_handler, process_pages_handler, project_handler,
    put_settings_handler, redo_handler, undo_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/project", get(project_handler))
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/pages", post(add_page_handler))
        .route("/pages/process", post(process_pages_handler))
        .route("/pages/:page_id/boxes", post(add_text_box_handler))
        .route(
            "/pages/:page_id/boxes/:box_id",
            patch(edit_text_box_handler).delete(delete_text_box_handler),
        )
        .route("/pages/:page_id/process", post(process_page_handler))
        .route("/history", get(history_handler).delete(clear_history_handler))
        .route("/history/undo", post(undo_handler))
        .route("/history/redo", post(redo_handler))
        .route("/cache/fetch", post(cache_fetch_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
