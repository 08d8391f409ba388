use chrono::Utc;
use sqlx::{PgPool, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    make_storage_key, ConfirmUploadDto, DashboardQuery, FileCategory, SignedUrlResponseDto,
};
use crate::features::files::models::FileRecord;
use crate::modules::mailer::Mailer;
use crate::modules::storage::S3Client;

/// A downloaded object plus the name and type to serve it under
pub struct DownloadedFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Service for file operations
pub struct FileService {
    pool: PgPool,
    storage: Arc<S3Client>,
    mailer: Arc<Mailer>,
}

impl FileService {
    pub fn new(pool: PgPool, storage: Arc<S3Client>, mailer: Arc<Mailer>) -> Self {
        Self {
            pool,
            storage,
            mailer,
        }
    }

    /// Store an uploaded file and its metadata record.
    ///
    /// The storage key is the upload timestamp in milliseconds joined to the
    /// original filename, which keeps concurrent same-name uploads apart.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        description: Option<String>,
        tags: Vec<String>,
        category: Option<FileCategory>,
        user: &AuthenticatedUser,
    ) -> Result<FileRecord> {
        let file_size = data.len() as i64;
        let file_key = make_storage_key(Utc::now().timestamp_millis(), original_filename);
        let category = category.unwrap_or_else(|| FileCategory::infer(content_type));

        self.storage.upload(&file_key, data, content_type).await?;
        debug!("File uploaded to storage: {}", file_key);

        let record = self
            .insert_metadata(
                &file_key,
                original_filename,
                content_type,
                file_size,
                description,
                tags,
                category,
                &user.user_id,
            )
            .await?;

        self.mailer.send_best_effort(
            &user.email,
            "EDMS: file uploaded",
            format!(
                "Your file \"{}\" ({} bytes) was uploaded successfully.",
                record.original_filename, record.file_size
            ),
        );

        Ok(record)
    }

    /// Phase 1 of direct upload: reserve a key and presign a PUT URL for it
    pub async fn presign_upload(
        &self,
        file_name: &str,
        _content_type: &str,
    ) -> Result<SignedUrlResponseDto> {
        let key = make_storage_key(Utc::now().timestamp_millis(), file_name);
        let url = self.storage.presign_upload(&key).await?;

        debug!("Presigned upload URL issued for key {}", key);
        Ok(SignedUrlResponseDto {
            key,
            url,
            expires_in_secs: self.storage.presign_expiry_secs(),
        })
    }

    /// Phase 2 of direct upload: the bytes are already in the store; read
    /// their actual size and content type from the store (the client is not
    /// trusted for either) and file the metadata record.
    pub async fn confirm_upload(
        &self,
        dto: &ConfirmUploadDto,
        tags: Vec<String>,
        user: &AuthenticatedUser,
    ) -> Result<FileRecord> {
        let info = self.storage.head(&dto.key).await?;
        let content_type = info
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let category = dto
            .category
            .as_deref()
            .and_then(FileCategory::parse)
            .unwrap_or_else(|| FileCategory::infer(&content_type));

        let record = self
            .insert_metadata(
                &dto.key,
                &dto.file_name,
                &content_type,
                info.size,
                dto.description.clone(),
                tags,
                category,
                &user.user_id,
            )
            .await?;

        self.mailer.send_best_effort(
            &user.email,
            "EDMS: file uploaded",
            format!(
                "Your file \"{}\" ({} bytes) was uploaded successfully.",
                record.original_filename, record.file_size
            ),
        );

        Ok(record)
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_metadata(
        &self,
        file_key: &str,
        original_filename: &str,
        content_type: &str,
        file_size: i64,
        description: Option<String>,
        tags: Vec<String>,
        category: FileCategory,
        uploaded_by: &str,
    ) -> Result<FileRecord> {
        let url = self.storage.object_url(file_key);

        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (file_key, original_filename, url, content_type, file_size, uploaded_by, description, tags, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(file_key)
        .bind(original_filename)
        .bind(&url)
        .bind(content_type)
        .bind(file_size)
        .bind(uploaded_by)
        .bind(&description)
        .bind(&tags)
        .bind(category.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db) = e {
                if db.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "File key '{}' already exists",
                        file_key
                    ));
                }
            }
            AppError::Database(e)
        })?;

        info!(
            "File metadata saved: key={}, category={}, size={}, uploaded_by={}",
            record.file_key, record.category, record.file_size, record.uploaded_by
        );
        Ok(record)
    }

    /// List files matching the dashboard's search/category filters in the
    /// requested order. The search term matches filename, uploader,
    /// description or any tag, case-insensitively.
    pub async fn list(&self, query: &DashboardQuery) -> Result<Vec<FileRecord>> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM files WHERE TRUE");

        if let Some(term) = query.search_term() {
            let pattern = format!("%{}%", term);
            builder.push(" AND (original_filename ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR uploaded_by ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR COALESCE(description, '') ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR array_to_string(tags, ' ') ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        if let Some(category) = query.category_filter() {
            builder.push(" AND category = ");
            builder.push_bind(category.as_str());
        }

        builder.push(query.sort_key().order_by());

        let files = builder
            .build_query_as::<FileRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(files)
    }

    pub async fn find_by_key(&self, file_key: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE file_key = $1")
            .bind(file_key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    /// Fetch a file's bytes for download. The served filename comes from the
    /// metadata record when present, else the storage key itself.
    pub async fn download(&self, file_key: &str) -> Result<DownloadedFile> {
        let record = self.find_by_key(file_key).await?;
        let bytes = self.storage.download(file_key).await?;

        let (filename, content_type) = match record {
            Some(record) => (record.original_filename, record.content_type),
            None => (
                file_key.to_string(),
                "application/octet-stream".to_string(),
            ),
        };

        Ok(DownloadedFile {
            bytes,
            filename,
            content_type,
        })
    }

    /// Delete a file's object and metadata record.
    ///
    /// Only the uploader or an admin may delete a file.
    pub async fn delete(&self, file_key: &str, requester: &AuthenticatedUser) -> Result<FileRecord> {
        let record = self
            .find_by_key(file_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File '{}' not found", file_key)))?;

        if !requester.is_admin() && record.uploaded_by != requester.user_id {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this file".to_string(),
            ));
        }

        self.storage.delete(file_key).await?;
        debug!("File deleted from storage: {}", file_key);

        sqlx::query("DELETE FROM files WHERE file_key = $1")
            .bind(file_key)
            .execute(&self.pool)
            .await?;

        info!("File deleted: key={}, by={}", file_key, requester.user_id);

        self.mailer.send_best_effort(
            &requester.email,
            "EDMS: file deleted",
            format!("The file \"{}\" was deleted.", record.original_filename),
        );

        Ok(record)
    }

    /// Cascade used by admin user deletion: remove every file a user
    /// uploaded. Storage deletions are best-effort; one failing object does
    /// not stop the rest, and the metadata rows go regardless.
    pub async fn delete_all_for_user(&self, user_id: &str) -> Result<u64> {
        let records =
            sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE uploaded_by = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        for record in &records {
            if let Err(e) = self.storage.delete(&record.file_key).await {
                warn!(
                    "Failed to delete object '{}' during cascade for user {}: {}",
                    record.file_key, user_id, e
                );
            }
        }

        let result = sqlx::query("DELETE FROM files WHERE uploaded_by = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            info!("Removed {} file records for deleted user {}", removed, user_id);
        }
        Ok(removed)
    }
}
