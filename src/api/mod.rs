//! API Module
//!
//! HTTP handlers and routing for the overlay REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /project` - Current project
//! - `GET|PUT /settings` - User settings
//! - `POST /pages` - Add a page
//! - `POST /pages/:page_id/boxes` - Add a text box
//! - `PATCH|DELETE /pages/:page_id/boxes/:box_id` - Edit or delete a text box
//! - `POST /pages/:page_id/process` - OCR and translate a page
//! - `POST /pages/process` - Process several pages, reporting each one
//! - `GET|DELETE /history` - Inspect or clear edit history
//! - `POST /history/undo`, `POST /history/redo`
//! - `POST /cache/fetch` - Read through one of the caches
//! - `GET /cache/stats` - Statistics for every cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
