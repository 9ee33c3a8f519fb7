//! Ingestion orchestration: stage → probe → classify → rewrite → upload →
//! finalize, one request at a time, no cross-request shared state.
//!
//! All per-request scratch files live in one `TempDir`, so every exit
//! path (success, any stage failure, panic) unlinks them on drop. The
//! catalog write is last and only happens after a confirmed store.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use uuid::Uuid;

use crate::error::IngestError;
use crate::keys::derive_storage_key;
use crate::orientation::{classify, Orientation};
use crate::probe::StreamGeometry;
use crate::traits::{ContainerRewriter, MediaProber, MediaStore, VideoCatalog};

/// What a successful ingest produced.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub storage_key: String,
    pub media_url: String,
    pub geometry: StreamGeometry,
    pub orientation: Orientation,
    pub bytes_staged: u64,
}

/// Drives the per-upload state machine. Stateless across requests;
/// collaborators are shared handles safe for concurrent independent calls.
pub struct IngestPipeline {
    prober: Arc<dyn MediaProber>,
    rewriter: Arc<dyn ContainerRewriter>,
    store: Arc<dyn MediaStore>,
    catalog: Arc<dyn VideoCatalog>,
    max_upload_bytes: u64,
    temp_root: PathBuf,
}

impl IngestPipeline {
    pub fn new(
        prober: Arc<dyn MediaProber>,
        rewriter: Arc<dyn ContainerRewriter>,
        store: Arc<dyn MediaStore>,
        catalog: Arc<dyn VideoCatalog>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            prober,
            rewriter,
            store,
            catalog,
            max_upload_bytes,
            temp_root: std::env::temp_dir(),
        }
    }

    /// Root directory for per-request scratch files. Tests point this at
    /// a throwaway directory to assert the cleanup invariant.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = root.into();
        self
    }

    /// Run one upload through the full pipeline.
    ///
    /// `body` is the inbound byte stream; it is staged to disk first
    /// because the downstream tools need a seekable, fully-written file.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id))]
    pub async fn ingest<S>(
        &self,
        video_id: Uuid,
        content_type: &str,
        body: S,
    ) -> Result<IngestOutcome, IngestError>
    where
        S: Stream<Item = std::io::Result<Bytes>> + Unpin + Send,
    {
        // Scratch space scoped to this request; dropped (and unlinked)
        // on every exit path out of this function.
        let scratch = tempfile::Builder::new()
            .prefix("ingest-")
            .tempdir_in(&self.temp_root)?;

        let staged_path = scratch.path().join("upload.mp4");
        let bytes_staged = stage_stream(&staged_path, body, self.max_upload_bytes).await?;
        tracing::debug!(stage = "staging", bytes = bytes_staged, "Upload staged to disk");

        let geometry = self.prober.probe(&staged_path).await?;
        tracing::debug!(
            stage = "probing",
            width = geometry.width,
            height = geometry.height,
            "Geometry probed"
        );

        let orientation = classify(geometry.width, geometry.height);
        tracing::debug!(stage = "classifying", orientation = %orientation, "Orientation classified");

        let rewritten_path = scratch.path().join("faststart.mp4");
        self.rewriter.rewrite(&staged_path, &rewritten_path).await?;
        verify_rewrite_output(&rewritten_path).await?;
        tracing::debug!(stage = "rewriting", "Container rewritten for fast start");

        // Key derivation happens only after classification succeeded, so
        // the label prefix always reflects real content. The store gets
        // the file path and streams it; the pipeline never buffers the
        // rewritten media in memory.
        let storage_key = derive_storage_key(orientation);
        let media_url = self
            .store
            .put(&storage_key, &rewritten_path, content_type)
            .await
            .map_err(IngestError::StorageWriteFailed)?;
        tracing::debug!(stage = "uploading", storage_key = %storage_key, "Media stored");

        self.catalog
            .set_media_location(video_id, &media_url)
            .await
            .map_err(IngestError::MetadataUpdateFailed)?;

        tracing::info!(
            storage_key = %storage_key,
            orientation = %orientation,
            bytes = bytes_staged,
            "Ingest completed"
        );

        Ok(IngestOutcome {
            storage_key,
            media_url,
            geometry,
            orientation,
            bytes_staged,
        })
    }
}

/// Copy the inbound stream to `path`, enforcing the size bound as bytes
/// arrive. The bound is a hard backpressure limit: the copy aborts the
/// moment it is crossed, before the rest of the stream is consumed.
async fn stage_stream<S>(path: &Path, mut body: S, limit: u64) -> Result<u64, IngestError>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin + Send,
{
    let file = File::create(path).await?;
    let mut writer = BufWriter::new(file);
    let mut written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        if written > limit {
            return Err(IngestError::SizeExceeded { limit });
        }
        writer.write_all(&chunk).await?;
    }
    writer.flush().await?;

    Ok(written)
}

/// The rewrite contract's postcondition: an output file exists and is
/// non-empty. An incomplete rewrite would otherwise upload an unplayable
/// asset that looks successful to the caller.
async fn verify_rewrite_output(path: &Path) -> Result<(), IngestError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| IngestError::RewriteFailed {
            stderr: format!("rewriter produced no output file: {e}"),
        })?;
    if meta.len() == 0 {
        return Err(IngestError::RewriteFailed {
            stderr: "rewriter produced an empty output file".to_string(),
        });
    }
    Ok(())
}
