//! Role-based authorization guards.
//!
//! Guards extract the authenticated user from request extensions (populated by
//! the session middleware) and verify the required role.
//!
//! Role tiers (highest to lowest):
//! - admin: full access including user management
//! - contributor: can upload, download and manage files
//! - viewer: read-only access to the dashboard and downloads

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for admin-only endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for endpoints that create files.
///
/// Allows contributors and admins; viewers are rejected.
pub struct RequireUploader(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireUploader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.can_upload() {
            return Err(AppError::Forbidden(
                "Viewers cannot upload files".to_string(),
            ));
        }

        Ok(RequireUploader(user.clone()))
    }
}
