use axum::{routing::get, Router};

use crate::features::pages::handlers;

/// Public pages: landing plus the login and register forms
pub fn routes() -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page))
        .route("/register", get(handlers::register_page))
}
