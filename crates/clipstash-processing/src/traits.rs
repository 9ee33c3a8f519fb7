//! Seams between the ingestion pipeline and its collaborators.
//!
//! External process invocation (probe, rewrite) and the storage/catalog
//! capabilities sit behind these traits so pipeline correctness tests do
//! not depend on real external tools, an object store, or a database.
//! The API crate implements `MediaStore` and `VideoCatalog` over its
//! storage backend and repository.

use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

use crate::error::IngestError;
use crate::probe::StreamGeometry;

/// Inspect a fully-written local media file and report the geometry of
/// its first video stream.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, IngestError>;
}

/// Rewrite a media container so its index metadata precedes the sample
/// data (fast-start). Must not mutate the input; writes to `output`,
/// a path the orchestrator owns and cleans up on every exit path.
#[async_trait]
pub trait ContainerRewriter: Send + Sync {
    async fn rewrite(&self, input: &Path, output: &Path) -> Result<(), IngestError>;
}

/// Object-storage capability: store a local file's bytes at a key, get
/// back the public URL. Takes a path, not a buffer, so implementations
/// stream from disk and a request never holds a whole upload in memory.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(
        &self,
        storage_key: &str,
        source: &Path,
        content_type: &str,
    ) -> anyhow::Result<String>;
}

/// Metadata-store capability: point a video record at its stored media.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn set_media_location(&self, video_id: Uuid, media_url: &str) -> anyhow::Result<()>;
}
