use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::features::files::models::FileRecord;

/// Maximum accepted upload size in bytes (100MB)
pub const MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

// =============================================================================
// CATEGORY
// =============================================================================

/// File categories shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Documents,
    Images,
    Presentations,
    Spreadsheets,
    Archives,
    Other,
}

impl FileCategory {
    pub const ALL: [FileCategory; 6] = [
        FileCategory::Documents,
        FileCategory::Images,
        FileCategory::Presentations,
        FileCategory::Spreadsheets,
        FileCategory::Archives,
        FileCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Documents => "documents",
            FileCategory::Images => "images",
            FileCategory::Presentations => "presentations",
            FileCategory::Spreadsheets => "spreadsheets",
            FileCategory::Archives => "archives",
            FileCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<FileCategory> {
        match value.trim().to_lowercase().as_str() {
            "documents" => Some(FileCategory::Documents),
            "images" => Some(FileCategory::Images),
            "presentations" => Some(FileCategory::Presentations),
            "spreadsheets" => Some(FileCategory::Spreadsheets),
            "archives" => Some(FileCategory::Archives),
            "other" => Some(FileCategory::Other),
            _ => None,
        }
    }

    /// Infer a category from a MIME type by family.
    ///
    /// Spreadsheets are matched before the generic text/ document rule so
    /// text/csv lands where users expect it.
    pub fn infer(content_type: &str) -> FileCategory {
        let ct = content_type.to_lowercase();

        if ct.starts_with("image/") {
            FileCategory::Images
        } else if ct.contains("presentation") || ct.contains("powerpoint") {
            FileCategory::Presentations
        } else if ct.contains("spreadsheet") || ct.contains("excel") || ct.contains("csv") {
            FileCategory::Spreadsheets
        } else if ct.contains("zip")
            || ct.contains("rar")
            || ct.contains("7z")
            || ct.contains("tar")
            || ct.contains("compressed")
        {
            FileCategory::Archives
        } else if ct.contains("pdf")
            || ct.contains("msword")
            || ct.contains("wordprocessingml")
            || ct.contains("rtf")
            || ct.starts_with("text/")
        {
            FileCategory::Documents
        } else {
            FileCategory::Other
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SORT
// =============================================================================

/// Dashboard sort keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSort {
    Newest,
    Oldest,
    Name,
    Size,
    Uploader,
}

impl FileSort {
    pub const ALL: [FileSort; 5] = [
        FileSort::Newest,
        FileSort::Oldest,
        FileSort::Name,
        FileSort::Size,
        FileSort::Uploader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileSort::Newest => "newest",
            FileSort::Oldest => "oldest",
            FileSort::Name => "name",
            FileSort::Size => "size",
            FileSort::Uploader => "uploader",
        }
    }

    /// Unknown or absent values fall back to newest-first
    pub fn parse(value: Option<&str>) -> FileSort {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("oldest") => FileSort::Oldest,
            Some("name") => FileSort::Name,
            Some("size") => FileSort::Size,
            Some("uploader") => FileSort::Uploader,
            _ => FileSort::Newest,
        }
    }

    /// ORDER BY clause for the file listing query
    pub fn order_by(&self) -> &'static str {
        match self {
            FileSort::Newest => " ORDER BY uploaded_at DESC",
            FileSort::Oldest => " ORDER BY uploaded_at ASC",
            FileSort::Name => " ORDER BY lower(original_filename) ASC",
            FileSort::Size => " ORDER BY file_size DESC",
            FileSort::Uploader => " ORDER BY uploaded_by ASC",
        }
    }
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// Query parameters of the dashboard listing
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl DashboardQuery {
    /// Trimmed search term, None when empty
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Parsed category filter; unrecognized values mean "no filter"
    pub fn category_filter(&self) -> Option<FileCategory> {
        self.category.as_deref().and_then(FileCategory::parse)
    }

    pub fn sort_key(&self) -> FileSort {
        FileSort::parse(self.sort.as_deref())
    }
}

/// File row as rendered on the dashboard
#[derive(Debug, Serialize)]
pub struct DashboardFileDto {
    pub original_filename: String,
    pub category: String,
    pub file_size: i64,
    pub uploaded_by: String,
    pub tags: Vec<String>,
    pub uploaded_at: String,
    /// Storage key, percent-encoded for use in /download and /delete links
    pub encoded_key: String,
}

impl From<&FileRecord> for DashboardFileDto {
    fn from(record: &FileRecord) -> Self {
        Self {
            original_filename: record.original_filename.clone(),
            category: record.category.clone(),
            file_size: record.file_size,
            uploaded_by: record.uploaded_by.clone(),
            tags: record.tags.clone(),
            uploaded_at: record.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
            encoded_key: urlencoding::encode(&record.file_key).into_owned(),
        }
    }
}

// =============================================================================
// DIRECT UPLOAD (two-phase)
// =============================================================================

/// Phase-1 request: ask for a presigned upload URL
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlRequestDto {
    /// Original filename of the upcoming upload
    #[validate(length(min = 1, message = "fileName is required"))]
    pub file_name: String,
    /// MIME type the client intends to send
    #[validate(length(min = 1, message = "contentType is required"))]
    pub content_type: String,
}

/// Phase-1 response: where to PUT the bytes
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponseDto {
    /// Storage key the metadata record will be filed under
    pub key: String,
    /// Time-limited presigned PUT URL
    pub url: String,
    /// URL lifetime in seconds
    pub expires_in_secs: u32,
}

/// Phase-2 request: the client has PUT the bytes, record the metadata
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmUploadDto {
    /// Storage key returned by phase 1
    #[validate(length(min = 1, message = "key is required"))]
    pub key: String,
    /// Original filename
    #[validate(length(min = 1, message = "fileName is required"))]
    pub file_name: String,
    pub description: Option<String>,
    /// Comma-separated tags
    pub tags: Option<String>,
    pub category: Option<String>,
}

/// Metadata record as returned by the JSON API
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponseDto {
    pub key: String,
    pub original_filename: String,
    pub url: String,
    pub content_type: String,
    pub file_size: i64,
    pub category: String,
    pub tags: Vec<String>,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponseDto {
    fn from(record: FileRecord) -> Self {
        Self {
            key: record.file_key,
            original_filename: record.original_filename,
            url: record.url,
            content_type: record.content_type,
            file_size: record.file_size,
            category: record.category,
            tags: record.tags,
            uploaded_by: record.uploaded_by,
            uploaded_at: record.uploaded_at,
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Collision-resistant storage key: millisecond timestamp prefix plus the
/// original filename.
pub fn make_storage_key(now_millis: i64, original_filename: &str) -> String {
    format!("{}-{}", now_millis, original_filename)
}

/// Sanitize a filename for the content-disposition header: control and other
/// non-printable characters are stripped, double quotes replaced, so the value
/// cannot break out of the quoted header.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' { '_' } else { c })
        .collect()
}

/// Split a comma-separated tag field into a deduplicated set of lowercase tags
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_inference_by_family() {
        assert_eq!(FileCategory::infer("image/png"), FileCategory::Images);
        assert_eq!(FileCategory::infer("image/svg+xml"), FileCategory::Images);
        assert_eq!(FileCategory::infer("application/pdf"), FileCategory::Documents);
        assert_eq!(FileCategory::infer("application/msword"), FileCategory::Documents);
        assert_eq!(
            FileCategory::infer(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            FileCategory::Documents
        );
        assert_eq!(FileCategory::infer("text/plain"), FileCategory::Documents);
        assert_eq!(
            FileCategory::infer("application/vnd.ms-powerpoint"),
            FileCategory::Presentations
        );
        assert_eq!(
            FileCategory::infer(
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            ),
            FileCategory::Presentations
        );
        assert_eq!(
            FileCategory::infer("application/vnd.ms-excel"),
            FileCategory::Spreadsheets
        );
        assert_eq!(FileCategory::infer("text/csv"), FileCategory::Spreadsheets);
        assert_eq!(FileCategory::infer("application/zip"), FileCategory::Archives);
        assert_eq!(
            FileCategory::infer("application/x-tar"),
            FileCategory::Archives
        );
        assert_eq!(
            FileCategory::infer("application/x-7z-compressed"),
            FileCategory::Archives
        );
        assert_eq!(
            FileCategory::infer("application/octet-stream"),
            FileCategory::Other
        );
        assert_eq!(FileCategory::infer(""), FileCategory::Other);
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(FileCategory::parse("Images"), Some(FileCategory::Images));
        assert_eq!(FileCategory::parse(" archives "), Some(FileCategory::Archives));
        assert_eq!(FileCategory::parse("videos"), None);
    }

    #[test]
    fn test_sort_parse_falls_back_to_newest() {
        assert_eq!(FileSort::parse(Some("oldest")), FileSort::Oldest);
        assert_eq!(FileSort::parse(Some("NAME")), FileSort::Name);
        assert_eq!(FileSort::parse(Some("bogus")), FileSort::Newest);
        assert_eq!(FileSort::parse(None), FileSort::Newest);
    }

    #[test]
    fn test_storage_key_keeps_original_name() {
        let key = make_storage_key(1700000000000, "report.pdf");
        assert_eq!(key, "1700000000000-report.pdf");
        let (_, name) = key.split_once('-').unwrap();
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("plain.pdf"), "plain.pdf");
        assert_eq!(sanitize_filename("a\"b\".txt"), "a_b_.txt");
        assert_eq!(sanitize_filename("bad\r\nname\t.txt"), "badname.txt");
        assert_eq!(sanitize_filename("\u{7f}x"), "x");
    }

    #[test]
    fn test_parse_tags_lowercases_and_dedupes() {
        assert_eq!(
            parse_tags("Work, reports,WORK , , budget"),
            vec!["work", "reports", "budget"]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn test_dashboard_query_accessors() {
        let query = DashboardQuery {
            search: Some("  Quarterly  ".to_string()),
            category: Some("IMAGES".to_string()),
            sort: Some("size".to_string()),
        };
        assert_eq!(query.search_term(), Some("Quarterly"));
        assert_eq!(query.category_filter(), Some(FileCategory::Images));
        assert_eq!(query.sort_key(), FileSort::Size);

        let empty = DashboardQuery {
            search: Some("   ".to_string()),
            category: Some("everything".to_string()),
            sort: None,
        };
        assert_eq!(empty.search_term(), None);
        assert_eq!(empty.category_filter(), None);
        assert_eq!(empty.sort_key(), FileSort::Newest);
    }
}
