//! Backend selection from configuration.

use std::sync::Arc;

use clipstash_core::{Config, StorageBackend};

use crate::local::LocalStorage;
use crate::s3::S3Storage;
use crate::traits::{Storage, StorageError, StorageResult};

/// Build the storage backend named by the configuration.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not set".to_string()))?;
            let region = config
                .s3_region
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_REGION not set".to_string()))?;

            tracing::info!(bucket = %bucket, region = %region, "Using S3 storage backend");
            Ok(Arc::new(
                S3Storage::new(bucket, region, config.s3_endpoint.clone()).await,
            ))
        }
        StorageBackend::Local => {
            let path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not set".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not set".to_string())
            })?;

            tracing::info!(path = %path, "Using local storage backend");
            Ok(Arc::new(LocalStorage::new(path, base_url).await?))
        }
    }
}
