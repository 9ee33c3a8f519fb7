//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use clipstash_core::StorageBackend;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// This lets the ingestion pipeline and the API work with any backend
/// without coupling to implementation details.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a local file under the given storage key and return the
    /// public URL. Streams from disk; the file is never buffered whole.
    async fn put_file(
        &self,
        storage_key: &str,
        source: &Path,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete a file by its storage key.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Public URL for a storage key. Pure formatting, no I/O.
    fn url_for(&self, storage_key: &str) -> String;

    /// Which backend this is.
    fn backend_type(&self) -> StorageBackend;
}
