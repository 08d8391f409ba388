use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::dtos::{LoginForm, RegisterForm};
use crate::features::auth::services::{AuthService, LoginOutcome, RegisterOutcome};
use crate::features::auth::session::{self, SessionStore};
use crate::features::auth::token::TokenService;
use crate::shared::constants::{SESSION_COOKIE, TOKEN_COOKIE};
use crate::shared::templates;

#[derive(Clone)]
pub struct AuthHandlerState {
    pub auth: Arc<AuthService>,
    pub sessions: Arc<dyn SessionStore>,
    pub tokens: Arc<TokenService>,
    pub cookie_secure: bool,
    pub ttl_hours: i64,
}

/// Handle the registration form.
///
/// Every outcome, including the rejections, is a 200 with its own rendered
/// result: these are user-correctable input problems, not server faults.
pub async fn register_submit(
    State(state): State<AuthHandlerState>,
    Form(form): Form<RegisterForm>,
) -> Result<Html<String>> {
    let outcome = state.auth.register(&form).await?;

    match outcome {
        RegisterOutcome::UserIdTaken => templates::render_result(
            "conflict-userid",
            "Registration failed",
            &format!("The user ID \"{}\" is already taken.", form.userid),
            "/register",
            "Back to registration",
        ),
        RegisterOutcome::EmailTaken => templates::render_result(
            "conflict-email",
            "Registration failed",
            &format!("The email \"{}\" is already registered.", form.email),
            "/register",
            "Back to registration",
        ),
        RegisterOutcome::PasswordMismatch => templates::render_result(
            "password-mismatch",
            "Registration failed",
            "The passwords do not match.",
            "/register",
            "Back to registration",
        ),
        RegisterOutcome::InvalidPhone => templates::render_result(
            "invalid-phone",
            "Registration failed",
            "Phone number must be in the format 123-456-7890.",
            "/register",
            "Back to registration",
        ),
        RegisterOutcome::Created(user) => templates::render_result(
            "registered",
            "Registration successful",
            &format!("Welcome {}! You can now log in.", user.first_name),
            "/login",
            "Go to login",
        ),
    }
}

/// Handle the login form. Success populates the session store and sets the
/// session + signed token cookies before redirecting to the dashboard.
pub async fn login_submit(
    State(state): State<AuthHandlerState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let outcome = state.auth.login(&form.userid, &form.password).await?;

    let user = match outcome {
        LoginOutcome::UserNotFound => {
            let page = templates::render_result(
                "user-not-found",
                "Login failed",
                &format!("No account found for user ID \"{}\".", form.userid),
                "/login",
                "Back to login",
            )?;
            return Ok(page.into_response());
        }
        LoginOutcome::WrongPassword => {
            let page = templates::render_result(
                "wrong-password",
                "Login failed",
                "Incorrect password.",
                "/login",
                "Back to login",
            )?;
            return Ok(page.into_response());
        }
        LoginOutcome::Success(user) => user,
    };

    let session_id = session::new_session_id();
    state.sessions.set(&session_id, user.clone()).await;
    let token = state.tokens.issue(&user)?;

    let jar = jar
        .add(session::session_cookie(
            &session_id,
            state.cookie_secure,
            state.ttl_hours,
        ))
        .add(session::token_cookie(
            &token,
            state.cookie_secure,
            state.ttl_hours,
        ));

    Ok((jar, Redirect::to("/dashboard")).into_response())
}

/// Destroy the session and clear both cookies
pub async fn logout(State(state): State<AuthHandlerState>, jar: CookieJar) -> Result<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
    }

    let jar = jar
        .remove(session::removal_cookie(SESSION_COOKIE))
        .remove(session::removal_cookie(TOKEN_COOKIE));

    Ok((jar, Redirect::to("/")).into_response())
}
