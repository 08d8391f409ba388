use crate::features::auth::handlers::{self, AuthHandlerState};
use axum::{
    routing::{get, post},
    Router,
};

/// Public auth routes (no authentication required)
pub fn public_routes(state: AuthHandlerState) -> Router {
    Router::new()
        .route("/registerSubmit", post(handlers::register_submit))
        .route("/loginSubmit", post(handlers::login_submit))
        .with_state(state)
}

/// Protected auth routes (require the session middleware)
pub fn protected_routes(state: AuthHandlerState) -> Router {
    Router::new()
        .route("/logout", get(handlers::logout))
        .with_state(state)
}
