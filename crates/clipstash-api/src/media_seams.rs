//! API-side implementations of the processing crate's collaborator seams,
//! bridging the pipeline to the storage backend and the video repository.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use clipstash_db::VideoRepository;
use clipstash_processing::{MediaStore, VideoCatalog};
use clipstash_storage::Storage;

pub struct StoreSeam {
    storage: Arc<dyn Storage>,
}

impl StoreSeam {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl MediaStore for StoreSeam {
    async fn put(
        &self,
        storage_key: &str,
        source: &Path,
        content_type: &str,
    ) -> anyhow::Result<String> {
        let url = self
            .storage
            .put_file(storage_key, source, content_type)
            .await?;
        Ok(url)
    }
}

pub struct CatalogSeam {
    videos: VideoRepository,
}

impl CatalogSeam {
    pub fn new(videos: VideoRepository) -> Self {
        Self { videos }
    }
}

#[async_trait]
impl VideoCatalog for CatalogSeam {
    async fn set_media_location(&self, video_id: Uuid, media_url: &str) -> anyhow::Result<()> {
        self.videos.set_media_url(video_id, media_url).await?;
        Ok(())
    }
}
