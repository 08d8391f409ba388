use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::constants::SESSION_COOKIE;
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files (two-phase direct upload)
        files_handlers::get_signed_url,
        files_handlers::confirm_upload,
        // Admin
        users_handlers::update_user_role,
        users_handlers::delete_user,
    ),
    components(
        schemas(
            // Files
            files_dtos::SignedUrlRequestDto,
            files_dtos::SignedUrlResponseDto,
            files_dtos::ConfirmUploadDto,
            files_dtos::FileResponseDto,
            files_dtos::FileCategory,
            ApiResponse<files_dtos::SignedUrlResponseDto>,
            ApiResponse<files_dtos::FileResponseDto>,
            // Admin
            users_dtos::UpdateUserRoleDto,
            users_dtos::UserRoleResponseDto,
            users_dtos::DeleteUserDto,
            users_dtos::DeleteUserResponseDto,
            ApiResponse<users_dtos::UserRoleResponseDto>,
            ApiResponse<users_dtos::DeleteUserResponseDto>,
        )
    ),
    tags(
        (name = "files", description = "File upload and management"),
        (name = "admin", description = "User management (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "EDMS API",
        version = "0.1.0",
        description = "API documentation for EDMS",
    )
)]
pub struct ApiDoc;

/// Adds the session-cookie security scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
