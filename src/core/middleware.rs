use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::session::{self, SessionStore};
use crate::features::auth::token::TokenService;
use crate::shared::constants::{SESSION_COOKIE, TOKEN_COOKIE};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            if let Some(auth_header) = auth_header {
                if let Some(encoded) = auth_header.strip_prefix("Basic ") {
                    if let Ok(decoded) = BASE64_STANDARD.decode(encoded) {
                        if let Ok(creds) = String::from_utf8(decoded) {
                            if creds == *credentials {
                                return Ok(next.run(req).await);
                            }
                        }
                    }
                }
            }

            let response = Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")
                .body(Body::from("Unauthorized"))
                .unwrap();

            Err(response)
        })
    }
}

// =============================================================================
// SESSION / TOKEN AUTHENTICATION
// =============================================================================

/// State for the session middleware
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionStore>,
    pub tokens: Arc<TokenService>,
    pub cookie_secure: bool,
    pub ttl_hours: i64,
}

/// Resolve the request's claims: the server-side session wins, the signed
/// token cookie is the fallback. Token verification fails silently to "no
/// user". Returns whether the claims came from the token alone, meaning the
/// session store is cold for this cookie.
pub async fn authenticate(
    state: &AuthState,
    jar: &CookieJar,
) -> Option<(AuthenticatedUser, bool)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(user) = state.sessions.get(cookie.value()).await {
            return Some((user, false));
        }
    }

    let token = jar.get(TOKEN_COOKIE)?;
    let user = state.tokens.verify(token.value())?;
    Some((user, true))
}

/// Gate protected routes behind the session/token pair.
///
/// On token-only authentication the session is repopulated before the handler
/// runs. Unauthenticated browser requests are redirected to the login page;
/// unauthenticated API requests get a 401 JSON body.
pub async fn session_auth_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some((user, session_cold)) = authenticate(&state, &jar).await else {
        if req.uri().path().starts_with("/api/") {
            return AppError::Unauthorized("Authentication required".to_string()).into_response();
        }
        return Redirect::to("/login").into_response();
    };

    let mut refreshed_cookie = None;
    if session_cold {
        let session_id = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .unwrap_or_else(session::new_session_id);
        state.sessions.set(&session_id, user.clone()).await;
        refreshed_cookie = Some(session::session_cookie(
            &session_id,
            state.cookie_secure,
            state.ttl_hours,
        ));
        tracing::debug!("Session repopulated from token for user {}", user.user_id);
    }

    req.extensions_mut().insert(user);
    let mut response = next.run(req).await;

    if let Some(cookie) = refreshed_cookie {
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::features::auth::session::InMemorySessionStore;
    use crate::shared::test_helpers::test_user;
    use axum_extra::extract::cookie::Cookie;
    use std::time::Duration;

    fn auth_state(sessions: Arc<InMemorySessionStore>) -> AuthState {
        AuthState {
            sessions,
            tokens: Arc::new(TokenService::new("test-secret", 24)),
            cookie_secure: false,
            ttl_hours: 24,
        }
    }

    #[tokio::test]
    async fn test_no_cookies_is_anonymous() {
        let state = auth_state(Arc::new(InMemorySessionStore::new(Duration::from_secs(60))));
        assert!(authenticate(&state, &CookieJar::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_session_wins_over_token() {
        let sessions = Arc::new(InMemorySessionStore::new(Duration::from_secs(60)));
        let state = auth_state(Arc::clone(&sessions));

        sessions.set("sid-1", test_user("from_session", Role::Viewer)).await;
        let token = state.tokens.issue(&test_user("from_token", Role::Admin)).unwrap();

        let jar = CookieJar::new()
            .add(Cookie::new(SESSION_COOKIE, "sid-1"))
            .add(Cookie::new(TOKEN_COOKIE, token));

        let (user, session_cold) = authenticate(&state, &jar).await.unwrap();
        assert_eq!(user.user_id, "from_session");
        assert!(!session_cold);
    }

    #[tokio::test]
    async fn test_token_fallback_when_session_cold() {
        let state = auth_state(Arc::new(InMemorySessionStore::new(Duration::from_secs(60))));
        let token = state.tokens.issue(&test_user("carol", Role::Contributor)).unwrap();

        let jar = CookieJar::new()
            .add(Cookie::new(SESSION_COOKIE, "unknown-sid"))
            .add(Cookie::new(TOKEN_COOKIE, token));

        let (user, session_cold) = authenticate(&state, &jar).await.unwrap();
        assert_eq!(user.user_id, "carol");
        assert!(session_cold);
    }

    #[tokio::test]
    async fn test_bad_token_is_anonymous() {
        let state = auth_state(Arc::new(InMemorySessionStore::new(Duration::from_secs(60))));
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "garbage"));
        assert!(authenticate(&state, &jar).await.is_none());
    }

    fn protected_app(state: AuthState) -> axum::Router {
        use axum::routing::get;

        axum::Router::new()
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/api/get-signed-url", get(|| async { "api" }))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                session_auth_middleware,
            ))
    }

    #[tokio::test]
    async fn test_unauthenticated_browser_request_redirects_to_login() {
        let state = auth_state(Arc::new(InMemorySessionStore::new(Duration::from_secs(60))));
        let server = axum_test::TestServer::new(protected_app(state)).unwrap();

        let response = server.get("/dashboard").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/login");
    }

    #[tokio::test]
    async fn test_unauthenticated_api_request_gets_401() {
        let state = auth_state(Arc::new(InMemorySessionStore::new(Duration::from_secs(60))));
        let server = axum_test::TestServer::new(protected_app(state)).unwrap();

        let response = server.get("/api/get-signed-url").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_cookie_reaches_the_handler() {
        let sessions = Arc::new(InMemorySessionStore::new(Duration::from_secs(60)));
        sessions.set("sid-9", test_user("dave", Role::Viewer)).await;
        let state = auth_state(Arc::clone(&sessions));
        let server = axum_test::TestServer::new(protected_app(state)).unwrap();

        let response = server
            .get("/dashboard")
            .add_cookie(Cookie::new(SESSION_COOKIE, "sid-9"))
            .await;
        response.assert_status_ok();
        response.assert_text("dashboard");
    }

    #[tokio::test]
    async fn test_token_only_auth_repopulates_the_session() {
        let sessions = Arc::new(InMemorySessionStore::new(Duration::from_secs(60)));
        let state = auth_state(Arc::clone(&sessions));
        let token = state.tokens.issue(&test_user("erin", Role::Contributor)).unwrap();
        let server = axum_test::TestServer::new(protected_app(state)).unwrap();

        let response = server
            .get("/dashboard")
            .add_cookie(Cookie::new(SESSION_COOKIE, "cold-sid"))
            .add_cookie(Cookie::new(TOKEN_COOKIE, token))
            .await;
        response.assert_status_ok();

        // The cold session id now resolves without the token
        assert_eq!(sessions.get("cold-sid").await.unwrap().user_id, "erin");
    }
}
