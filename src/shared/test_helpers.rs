#[cfg(test)]
use crate::features::auth::model::{AuthenticatedUser, Role};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};

#[cfg(test)]
#[allow(dead_code)]
pub fn test_user(user_id: &str, role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: user_id.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: format!("{}@example.com", user_id),
        role,
    }
}

/// Wrap a router so every request carries the given claims, bypassing the
/// session middleware in handler tests.
#[cfg(test)]
#[allow(dead_code)]
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
