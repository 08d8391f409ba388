//! Storage module for file management
//!
//! Provides an S3-compatible storage client for file uploads, downloads,
//! deletion and presigned upload URL generation.

mod s3_client;

pub use s3_client::{ObjectInfo, S3Client};
