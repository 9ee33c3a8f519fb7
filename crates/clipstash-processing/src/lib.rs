//! Media ingestion and transcode-staging pipeline.
//!
//! One upload request flows staged-to-disk → geometry probe → orientation
//! classification → fast-start container rewrite → object-store upload →
//! catalog update. External tools (ffprobe/ffmpeg) and the storage and
//! catalog collaborators sit behind narrow traits so the orchestration is
//! unit-testable against fakes.

pub mod error;
pub mod faststart;
pub mod keys;
pub mod orientation;
pub mod pipeline;
pub mod probe;
pub mod traits;

pub use error::{IngestError, IngestStage};
pub use faststart::FfmpegRewriter;
pub use keys::derive_storage_key;
pub use orientation::{classify, Orientation};
pub use pipeline::{IngestOutcome, IngestPipeline};
pub use probe::{FfprobeProber, StreamGeometry};
pub use traits::{ContainerRewriter, MediaProber, MediaStore, VideoCatalog};
