use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for file metadata. The bytes themselves live in the object
/// store under `file_key`.
#[derive(Debug, Clone, FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub file_key: String,
    pub original_filename: String,
    pub url: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_by: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub category: String,
    pub uploaded_at: DateTime<Utc>,
}
