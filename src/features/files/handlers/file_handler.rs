use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireUploader;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    parse_tags, sanitize_filename, ConfirmUploadDto, DashboardFileDto, DashboardQuery,
    FileCategory, FileResponseDto, FileSort, SignedUrlRequestDto, SignedUrlResponseDto,
    MAX_FILE_SIZE,
};
use crate::features::files::services::FileService;
use crate::shared::templates;
use crate::shared::types::ApiResponse;

#[derive(Clone)]
pub struct FileState {
    pub files: Arc<FileService>,
}

/// Render the dashboard: the filtered, sorted file list with the query
/// parameters echoed back for the form controls.
pub async fn dashboard(
    user: AuthenticatedUser,
    State(state): State<FileState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>> {
    let records = state.files.list(&query).await?;
    let files: Vec<DashboardFileDto> = records.iter().map(DashboardFileDto::from).collect();

    let categories: Vec<&str> = FileCategory::ALL.iter().map(|c| c.as_str()).collect();
    let sorts: Vec<&str> = FileSort::ALL.iter().map(|s| s.as_str()).collect();

    templates::render(
        "dashboard.html",
        minijinja::context! {
            user => user,
            files => files,
            search => query.search_term().unwrap_or(""),
            category => query.category_filter().map(|c| c.as_str()).unwrap_or(""),
            sort => query.sort_key().as_str(),
            categories => categories,
            sorts => sorts,
        },
    )
}

fn file_too_large_page() -> Result<Response> {
    let page = templates::render_result(
        "file-too-large",
        "File too large",
        "The selected file exceeds the 100MB upload limit.",
        "/dashboard",
        "Back to dashboard",
    )?;
    Ok(page.into_response())
}

fn is_length_limit_error(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("length limit") || message.contains("exceeded")
}

/// Handle a multipart upload.
///
/// Viewers are rejected by the guard. An oversized payload gets its own
/// friendly result page instead of a generic error.
pub async fn upload(
    RequireUploader(user): RequireUploader,
    State(state): State<FileState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut description: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut category: Option<FileCategory> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if is_length_limit_error(&e.to_string()) => return file_too_large_page(),
            Err(e) => {
                debug!("Failed to read multipart field: {}", e);
                return Err(AppError::BadRequest(format!(
                    "Failed to read multipart data: {}",
                    e
                )));
            }
        };

        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let ct = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(e) if is_length_limit_error(&e.to_string()) => {
                        return file_too_large_page()
                    }
                    Err(e) => {
                        debug!("Failed to read file bytes: {}", e);
                        return Err(AppError::BadRequest(format!(
                            "Failed to read file data: {}",
                            e
                        )));
                    }
                };

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                content_type = Some(ct);
            }
            "description" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read description field: {}", e))
                })?;
                if !text.trim().is_empty() {
                    description = Some(text.trim().to_string());
                }
            }
            "tags" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read tags field: {}", e))
                })?;
                tags = parse_tags(&text);
            }
            "category" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read category field: {}", e))
                })?;
                category = FileCategory::parse(&text);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let Some(file_data) = file_data else {
        let page = templates::render_result(
            "missing-file",
            "No file selected",
            "Choose a file before submitting the upload form.",
            "/dashboard",
            "Back to dashboard",
        )?;
        return Ok(page.into_response());
    };
    let file_name = file_name.unwrap_or_else(|| "unnamed".to_string());
    let content_type =
        content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    if file_data.len() > MAX_FILE_SIZE {
        return file_too_large_page();
    }

    state
        .files
        .upload(
            file_data,
            &file_name,
            &content_type,
            description,
            tags,
            category,
            &user,
        )
        .await?;

    Ok(Redirect::to("/dashboard").into_response())
}

/// Delete a file by its storage key, then return to the dashboard
pub async fn delete(
    user: AuthenticatedUser,
    State(state): State<FileState>,
    Path(key): Path<String>,
) -> Result<Redirect> {
    state.files.delete(&key, &user).await?;
    Ok(Redirect::to("/dashboard"))
}

/// Stream a file's bytes back with a content-disposition header
pub async fn download(
    _user: AuthenticatedUser,
    State(state): State<FileState>,
    Path(key): Path<String>,
) -> Result<Response> {
    let file = state.files.download(&key).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_filename(&file.filename)
    );

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// Phase 1 of direct upload: presign a PUT URL
///
/// Exists so large files can bypass the request-body ceiling by going straight
/// to the object store.
#[utoipa::path(
    post,
    path = "/api/get-signed-url",
    tag = "files",
    request_body = SignedUrlRequestDto,
    responses(
        (status = 200, description = "Presigned upload URL", body = ApiResponse<SignedUrlResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn get_signed_url(
    RequireUploader(_user): RequireUploader,
    State(state): State<FileState>,
    AppJson(dto): AppJson<SignedUrlRequestDto>,
) -> Result<Json<ApiResponse<SignedUrlResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = state
        .files
        .presign_upload(&dto.file_name, &dto.content_type)
        .await?;

    Ok(Json(ApiResponse::success(Some(response), None)))
}

/// Phase 2 of direct upload: record metadata for bytes already in the store
#[utoipa::path(
    post,
    path = "/api/confirm-upload",
    tag = "files",
    request_body = ConfirmUploadDto,
    responses(
        (status = 200, description = "Metadata recorded", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "No object under the given key")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn confirm_upload(
    RequireUploader(user): RequireUploader,
    State(state): State<FileState>,
    AppJson(dto): AppJson<ConfirmUploadDto>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tags = dto.tags.as_deref().map(parse_tags).unwrap_or_default();
    let record = state.files.confirm_upload(&dto, tags, &user).await?;

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some("Upload confirmed".to_string()),
    )))
}
