use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::services::FileService;
use crate::features::users::handlers::{self, AdminState};
use crate::features::users::services::UserService;

/// Admin page route. Auth middleware is applied by the caller.
pub fn page_routes(users: Arc<UserService>, files: Arc<FileService>) -> Router {
    let state = AdminState { users, files };

    Router::new()
        .route("/admin", get(handlers::admin_page))
        .with_state(state)
}

/// Admin JSON API routes
pub fn api_routes(users: Arc<UserService>, files: Arc<FileService>) -> Router {
    let state = AdminState { users, files };

    Router::new()
        .route("/api/update-user-role", post(handlers::update_user_role))
        .route("/api/delete-user", post(handlers::delete_user))
        .with_state(state)
}
