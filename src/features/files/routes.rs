use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::{self, FileState};
use crate::features::files::services::FileService;

/// Browser-facing file routes (dashboard, upload form target, delete and
/// download links). Auth middleware is applied by the caller.
pub fn page_routes(files: Arc<FileService>) -> Router {
    let state = FileState { files };

    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route(
            "/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(handlers::upload).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/delete/{key}", get(handlers::delete))
        .route("/download/{key}", get(handlers::download))
        .with_state(state)
}

/// JSON API routes for the two-phase direct upload
pub fn api_routes(files: Arc<FileService>) -> Router {
    let state = FileState { files };

    Router::new()
        .route("/api/get-signed-url", post(handlers::get_signed_url))
        .route("/api/confirm-upload", post(handlers::confirm_upload))
        .with_state(state)
}
