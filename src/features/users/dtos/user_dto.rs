use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::User;

/// Request DTO for changing a user's role
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRoleDto {
    /// Target user's identifier
    #[validate(length(min = 1, message = "userId is required"))]
    #[serde(rename = "userId")]
    pub user_id: String,
    /// New role: "admin", "contributor" or "viewer"
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

/// Response DTO after a role change
#[derive(Debug, Serialize, ToSchema)]
pub struct UserRoleResponseDto {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: String,
}

/// Request DTO for deleting a user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteUserDto {
    /// Target user's identifier
    #[validate(length(min = 1, message = "userId is required"))]
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response DTO after a user deletion
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteUserResponseDto {
    pub deleted: bool,
    /// Number of file records removed in the cascade
    #[serde(rename = "filesRemoved")]
    pub files_removed: u64,
}

/// User row as shown on the admin page
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserDto {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub protected: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for AdminUserDto {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            protected: user.protected,
            created_at: user.created_at,
        }
    }
}
