use axum::{extract::State, response::Html, Json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::Role;
use crate::features::files::services::FileService;
use crate::features::users::dtos::{
    AdminUserDto, DeleteUserDto, DeleteUserResponseDto, UpdateUserRoleDto, UserRoleResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::templates;
use crate::shared::types::ApiResponse;

#[derive(Clone)]
pub struct AdminState {
    pub users: Arc<UserService>,
    pub files: Arc<FileService>,
}

/// Render the user-management page
pub async fn admin_page(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AdminState>,
) -> Result<Html<String>> {
    let users = state.users.list_all().await?;
    let rows: Vec<AdminUserDto> = users.iter().map(AdminUserDto::from).collect();

    templates::render("admin.html", minijinja::context! { users => rows })
}

/// Change a user's role
///
/// Protected system accounts reject the change with a clear error.
#[utoipa::path(
    post,
    path = "/api/update-user-role",
    tag = "admin",
    request_body = UpdateUserRoleDto,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UserRoleResponseDto>),
        (status = 400, description = "Unknown role"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required or protected account"),
        (status = 404, description = "User not found")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn update_user_role(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AdminState>,
    AppJson(dto): AppJson<UpdateUserRoleDto>,
) -> Result<Json<ApiResponse<UserRoleResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let role = Role::parse(&dto.role).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown role '{}'; expected admin, contributor or viewer",
            dto.role
        ))
    })?;

    let user = state.users.set_role(&dto.user_id, role).await?;

    Ok(Json(ApiResponse::success(
        Some(UserRoleResponseDto {
            user_id: user.user_id,
            role: user.role,
        }),
        Some("Role updated".to_string()),
    )))
}

/// Delete a user and everything they uploaded
///
/// The cascade removes the user's objects from storage (best-effort, one
/// failing object does not abort the rest), their metadata records, and
/// finally the account itself. Admins cannot delete themselves or protected
/// accounts.
#[utoipa::path(
    post,
    path = "/api/delete-user",
    tag = "admin",
    request_body = DeleteUserDto,
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<DeleteUserResponseDto>),
        (status = 400, description = "Attempted self-deletion"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required or protected account"),
        (status = 404, description = "User not found")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AdminState>,
    AppJson(dto): AppJson<DeleteUserDto>,
) -> Result<Json<ApiResponse<DeleteUserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if dto.user_id == admin.user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let target = state
        .users
        .find_by_user_id(&dto.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", dto.user_id)))?;

    if target.protected {
        return Err(AppError::Forbidden(
            "Protected system accounts cannot be deleted".to_string(),
        ));
    }

    let files_removed = state.files.delete_all_for_user(&dto.user_id).await?;
    state.users.delete(&dto.user_id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteUserResponseDto {
            deleted: true,
            files_removed,
        }),
        Some("User deleted".to_string()),
    )))
}
