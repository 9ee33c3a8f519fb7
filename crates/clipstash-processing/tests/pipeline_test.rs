//! Pipeline tests against fake collaborators: no ffmpeg, no ffprobe,
//! no object store, no database.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use clipstash_processing::{
    ContainerRewriter, IngestError, IngestPipeline, IngestStage, MediaProber, MediaStore,
    Orientation, StreamGeometry, VideoCatalog,
};

struct FakeProber {
    geometry: Option<StreamGeometry>,
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, _path: &Path) -> Result<StreamGeometry, IngestError> {
        self.geometry.ok_or(IngestError::NoVideoStream)
    }
}

enum RewriteBehavior {
    CopyInput,
    WriteEmpty,
    Fail,
}

struct FakeRewriter {
    behavior: RewriteBehavior,
}

#[async_trait]
impl ContainerRewriter for FakeRewriter {
    async fn rewrite(&self, input: &Path, output: &Path) -> Result<(), IngestError> {
        match self.behavior {
            RewriteBehavior::CopyInput => {
                tokio::fs::copy(input, output).await?;
                Ok(())
            }
            RewriteBehavior::WriteEmpty => {
                tokio::fs::write(output, b"").await?;
                Ok(())
            }
            RewriteBehavior::Fail => Err(IngestError::RewriteFailed {
                stderr: "simulated rewrite failure".to_string(),
            }),
        }
    }
}

/// Snapshots the staged input it is handed and writes a byte-distinct
/// output, so tests can check the rewrite never touches its input file.
#[derive(Default)]
struct SnapshottingRewriter {
    seen_input: Mutex<Vec<u8>>,
}

#[async_trait]
impl ContainerRewriter for SnapshottingRewriter {
    async fn rewrite(&self, input: &Path, output: &Path) -> Result<(), IngestError> {
        let before = tokio::fs::read(input).await?;
        let mut rewritten = b"moov".to_vec();
        rewritten.extend_from_slice(&before);
        tokio::fs::write(output, &rewritten).await?;

        let after = tokio::fs::read(input).await?;
        assert_eq!(before, after, "rewrite must not mutate its input");
        *self.seen_input.lock().unwrap() = before;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingStore {
    fail: bool,
    puts: Mutex<Vec<(String, Vec<u8>, String)>>,
}

#[async_trait]
impl MediaStore for RecordingStore {
    async fn put(
        &self,
        storage_key: &str,
        source: &Path,
        content_type: &str,
    ) -> anyhow::Result<String> {
        if self.fail {
            anyhow::bail!("simulated storage outage");
        }
        // The pipeline hands over a path; the store reads from disk.
        let data = tokio::fs::read(source).await?;
        self.puts.lock().unwrap().push((
            storage_key.to_string(),
            data,
            content_type.to_string(),
        ));
        Ok(format!("https://cdn.test/{storage_key}"))
    }
}

#[derive(Default)]
struct RecordingCatalog {
    fail: bool,
    updates: Mutex<Vec<(Uuid, String)>>,
}

#[async_trait]
impl VideoCatalog for RecordingCatalog {
    async fn set_media_location(&self, video_id: Uuid, media_url: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("simulated database outage");
        }
        self.updates
            .lock()
            .unwrap()
            .push((video_id, media_url.to_string()));
        Ok(())
    }
}

struct Harness {
    pipeline: IngestPipeline,
    store: Arc<RecordingStore>,
    catalog: Arc<RecordingCatalog>,
    temp_root: tempfile::TempDir,
}

fn harness(
    geometry: Option<StreamGeometry>,
    rewrite: RewriteBehavior,
    store_fails: bool,
    catalog_fails: bool,
    max_upload_bytes: u64,
) -> Harness {
    let store = Arc::new(RecordingStore {
        fail: store_fails,
        ..Default::default()
    });
    let catalog = Arc::new(RecordingCatalog {
        fail: catalog_fails,
        ..Default::default()
    });
    let temp_root = tempfile::tempdir().unwrap();
    let pipeline = IngestPipeline::new(
        Arc::new(FakeProber { geometry }),
        Arc::new(FakeRewriter { behavior: rewrite }),
        store.clone(),
        catalog.clone(),
        max_upload_bytes,
    )
    .with_temp_root(temp_root.path());

    Harness {
        pipeline,
        store,
        catalog,
        temp_root,
    }
}

fn body_of(chunks: &[&'static [u8]]) -> impl futures::Stream<Item = std::io::Result<Bytes>> + Unpin {
    stream::iter(
        chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c)))
            .collect::<Vec<_>>(),
    )
}

fn assert_scratch_cleaned(harness: &Harness) {
    let leftover = std::fs::read_dir(harness.temp_root.path()).unwrap().count();
    assert_eq!(leftover, 0, "request left temporary files behind");
}

const HD_LANDSCAPE: StreamGeometry = StreamGeometry {
    width: 1280,
    height: 720,
};

#[tokio::test]
async fn successful_ingest_stores_once_and_finalizes_once() {
    let h = harness(
        Some(HD_LANDSCAPE),
        RewriteBehavior::CopyInput,
        false,
        false,
        1 << 20,
    );
    let video_id = Uuid::new_v4();

    let outcome = h
        .pipeline
        .ingest(video_id, "video/mp4", body_of(&[b"abc", b"defg", b"hi"]))
        .await
        .unwrap();

    assert_eq!(outcome.orientation, Orientation::Landscape);
    assert_eq!(outcome.geometry, HD_LANDSCAPE);
    assert_eq!(outcome.bytes_staged, 9);
    assert!(outcome.storage_key.starts_with("landscape/"));
    let token = outcome.storage_key.split_once('/').unwrap().1;
    assert!(token.len() >= 40);
    assert!(token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

    let puts = h.store.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    let (key, data, content_type) = &puts[0];
    assert_eq!(key, &outcome.storage_key);
    assert_eq!(data, b"abcdefghi");
    assert_eq!(content_type, "video/mp4");
    drop(puts);

    let updates = h.catalog.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0], (video_id, outcome.media_url.clone()));
    assert_eq!(
        outcome.media_url,
        format!("https://cdn.test/{}", outcome.storage_key)
    );
    drop(updates);

    assert_scratch_cleaned(&h);
}

#[tokio::test]
async fn portrait_geometry_yields_portrait_key() {
    let h = harness(
        Some(StreamGeometry {
            width: 1080,
            height: 1920,
        }),
        RewriteBehavior::CopyInput,
        false,
        false,
        1 << 20,
    );

    let outcome = h
        .pipeline
        .ingest(Uuid::new_v4(), "video/mp4", body_of(&[b"payload"]))
        .await
        .unwrap();

    assert_eq!(outcome.orientation, Orientation::Portrait);
    assert!(outcome.storage_key.starts_with("portrait/"));
}

#[tokio::test]
async fn rewrite_consumes_staged_input_without_mutating_it() {
    let store = Arc::new(RecordingStore::default());
    let catalog = Arc::new(RecordingCatalog::default());
    let rewriter = Arc::new(SnapshottingRewriter::default());
    let temp_root = tempfile::tempdir().unwrap();
    let pipeline = IngestPipeline::new(
        Arc::new(FakeProber {
            geometry: Some(HD_LANDSCAPE),
        }),
        rewriter.clone(),
        store.clone(),
        catalog,
        1 << 20,
    )
    .with_temp_root(temp_root.path());

    pipeline
        .ingest(Uuid::new_v4(), "video/mp4", body_of(&[b"sample ", b"data"]))
        .await
        .unwrap();

    // The rewriter saw exactly the staged bytes, unmodified.
    assert_eq!(rewriter.seen_input.lock().unwrap().as_slice(), b"sample data");

    // What got uploaded is the byte-distinct rewritten file, not the input.
    let puts = store.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].1, [b"moov".as_slice(), b"sample data"].concat());
}

#[tokio::test]
async fn oversized_stream_is_rejected_during_staging() {
    let h = harness(
        Some(HD_LANDSCAPE),
        RewriteBehavior::CopyInput,
        false,
        false,
        10,
    );

    let err = h
        .pipeline
        .ingest(
            Uuid::new_v4(),
            "video/mp4",
            body_of(&[b"eight by", b"eight by", b"eight by"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::SizeExceeded { limit: 10 }));
    assert_eq!(err.stage(), IngestStage::Staging);
    assert!(h.store.puts.lock().unwrap().is_empty());
    assert!(h.catalog.updates.lock().unwrap().is_empty());
    assert_scratch_cleaned(&h);
}

#[tokio::test]
async fn stream_read_failure_aborts_staging() {
    let h = harness(
        Some(HD_LANDSCAPE),
        RewriteBehavior::CopyInput,
        false,
        false,
        1 << 20,
    );

    let body = stream::iter(vec![
        Ok(Bytes::from_static(b"good chunk")),
        Err(std::io::Error::other("connection reset")),
    ]);

    let err = h
        .pipeline
        .ingest(Uuid::new_v4(), "video/mp4", body)
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::StagingIo(_)));
    assert!(h.store.puts.lock().unwrap().is_empty());
    assert_scratch_cleaned(&h);
}

#[tokio::test]
async fn upload_without_video_stream_fails_before_rewrite() {
    let h = harness(None, RewriteBehavior::CopyInput, false, false, 1 << 20);

    let err = h
        .pipeline
        .ingest(Uuid::new_v4(), "video/mp4", body_of(&[b"not a video"]))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::NoVideoStream));
    assert_eq!(err.stage(), IngestStage::Probing);
    assert!(h.store.puts.lock().unwrap().is_empty());
    assert!(h.catalog.updates.lock().unwrap().is_empty());
    assert_scratch_cleaned(&h);
}

#[tokio::test]
async fn rewrite_failure_cleans_up_and_never_uploads() {
    let h = harness(
        Some(HD_LANDSCAPE),
        RewriteBehavior::Fail,
        false,
        false,
        1 << 20,
    );

    let err = h
        .pipeline
        .ingest(Uuid::new_v4(), "video/mp4", body_of(&[b"payload"]))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::RewriteFailed { .. }));
    assert!(h.store.puts.lock().unwrap().is_empty());
    assert_scratch_cleaned(&h);
}

#[tokio::test]
async fn empty_rewrite_output_is_treated_as_rewrite_failure() {
    let h = harness(
        Some(HD_LANDSCAPE),
        RewriteBehavior::WriteEmpty,
        false,
        false,
        1 << 20,
    );

    let err = h
        .pipeline
        .ingest(Uuid::new_v4(), "video/mp4", body_of(&[b"payload"]))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::RewriteFailed { .. }));
    assert!(h.store.puts.lock().unwrap().is_empty());
    assert_scratch_cleaned(&h);
}

#[tokio::test]
async fn storage_failure_is_terminal_and_skips_finalize() {
    let h = harness(
        Some(HD_LANDSCAPE),
        RewriteBehavior::CopyInput,
        true,
        false,
        1 << 20,
    );

    let err = h
        .pipeline
        .ingest(Uuid::new_v4(), "video/mp4", body_of(&[b"payload"]))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::StorageWriteFailed(_)));
    assert_eq!(err.stage(), IngestStage::Uploading);
    assert!(h.catalog.updates.lock().unwrap().is_empty());
    assert_scratch_cleaned(&h);
}

#[tokio::test]
async fn catalog_failure_surfaces_after_upload() {
    let h = harness(
        Some(HD_LANDSCAPE),
        RewriteBehavior::CopyInput,
        false,
        true,
        1 << 20,
    );

    let err = h
        .pipeline
        .ingest(Uuid::new_v4(), "video/mp4", body_of(&[b"payload"]))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::MetadataUpdateFailed(_)));
    assert_eq!(err.stage(), IngestStage::Finalizing);
    // The store write did happen; only the record update failed.
    assert_eq!(h.store.puts.lock().unwrap().len(), 1);
    assert_scratch_cleaned(&h);
}
