use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use clipstash_core::StorageBackend;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance.
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/clipstash/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, rejecting keys that could
    /// escape the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(storage_key))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    #[tracing::instrument(skip(self), fields(storage.key = %storage_key))]
    async fn put_file(
        &self,
        storage_key: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(source, &path).await?;

        Ok(self.url_for(storage_key))
    }

    #[tracing::instrument(skip(self), fields(storage.key = %storage_key))]
    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    fn url_for(&self, storage_key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage_in(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap()
    }

    fn source_file(dir: &tempfile::TempDir, contents: &[u8]) -> PathBuf {
        let path = dir.path().join("staged.mp4");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn put_file_copies_source_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;
        let source = source_file(&scratch, b"hello");

        let url = storage
            .put_file("landscape/abc123", &source, "video/mp4")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/media/landscape/abc123");
        let on_disk = std::fs::read(dir.path().join("landscape/abc123")).unwrap();
        assert_eq!(on_disk, b"hello");
        // The source file belongs to the caller and survives the upload.
        assert!(source.exists());
    }

    #[tokio::test]
    async fn delete_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;
        let source = source_file(&scratch, b"data");

        storage
            .put_file("portrait/xyz", &source, "video/mp4")
            .await
            .unwrap();
        storage.delete("portrait/xyz").await.unwrap();
        assert!(!dir.path().join("portrait/xyz").exists());

        // Deleting again is not an error.
        storage.delete("portrait/xyz").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir).await;
        let source = source_file(&scratch, b"x");

        let err = storage
            .put_file("../escape", &source, "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));

        let err = storage.delete("/absolute/path").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
