//! S3-compatible storage client
//!
//! Works against AWS S3, MinIO or any S3-compatible endpoint.
//! Uses rust-s3 crate for lightweight S3 operations.

use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::S3Config;
use crate::core::error::AppError;

/// Stored-object attributes as reported by the store itself
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub size: i64,
    pub content_type: Option<String>,
}

pub struct S3Client {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    presign_expiry_secs: u32,
}

impl S3Client {
    /// Create a new storage client from configuration and make sure the
    /// bucket exists.
    pub async fn new(config: S3Config) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to open bucket: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket) for MinIO compatibility
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            presign_expiry_secs: config.presign_expiry_secs,
        };

        client.ensure_bucket_exists().await?;

        info!(
            "Storage client initialized for endpoint: {}, bucket: {}",
            client.endpoint,
            client.bucket.name()
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        match Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        {
            Ok(_) => {
                info!("Bucket '{}' created", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                    Ok(())
                } else {
                    // The bucket may exist with different permissions; don't
                    // refuse to start over it
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                    Ok(())
                }
            }
        }
    }

    fn is_not_found(error: &s3::error::S3Error) -> bool {
        let error_str = error.to_string();
        error_str.contains("404") || error_str.contains("NoSuchKey")
    }

    /// Upload a file under the given key
    pub async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    /// Download a file's bytes
    pub async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let response = self.bucket.get_object(key).await.map_err(|e| {
            if Self::is_not_found(&e) {
                AppError::NotFound(format!("File '{}' not found in storage", key))
            } else {
                AppError::Storage(format!("Failed to download '{}': {}", key, e))
            }
        })?;

        debug!("Downloaded '{}' from bucket '{}'", key, self.bucket.name());
        Ok(response.to_vec())
    }

    /// Delete a file from the storage
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete '{}': {}", key, e)))?;

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    /// Read an object's stored size and content type
    pub async fn head(&self, key: &str) -> Result<ObjectInfo, AppError> {
        match self.bucket.head_object(key).await {
            Ok((head, _)) => Ok(ObjectInfo {
                size: head.content_length.unwrap_or(0),
                content_type: head.content_type,
            }),
            Err(e) if Self::is_not_found(&e) => Err(AppError::NotFound(format!(
                "File '{}' not found in storage",
                key
            ))),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to stat '{}': {}",
                key, e
            ))),
        }
    }

    /// Generate a time-limited presigned PUT URL so a client can upload
    /// directly to the store without holding credentials
    pub async fn presign_upload(&self, key: &str) -> Result<String, AppError> {
        self.bucket
            .presign_put(key, self.presign_expiry_secs, None, None)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to generate presigned URL for '{}': {}",
                    key, e
                ))
            })
    }

    /// Direct URL of an object (path-style)
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket.name(), key)
    }

    /// Presigned upload URL lifetime in seconds
    pub fn presign_expiry_secs(&self) -> u32 {
        self.presign_expiry_secs
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}
