//! Ingestion error taxonomy.
//!
//! Every failure is terminal for its request: nothing here is retried,
//! and the pipeline removes all temporary files before returning any of
//! these. Tool stderr is carried for operators; the HTTP layer never
//! echoes it to callers.

use thiserror::Error;

/// Pipeline stage of one upload request. Stages run strictly in this
/// order; each stage's output is the next stage's required input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Staging,
    Probing,
    Classifying,
    Rewriting,
    Uploading,
    Finalizing,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::Staging => "staging",
            IngestStage::Probing => "probing",
            IngestStage::Classifying => "classifying",
            IngestStage::Rewriting => "rewriting",
            IngestStage::Uploading => "uploading",
            IngestStage::Finalizing => "finalizing",
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("upload exceeds size limit of {limit} bytes")]
    SizeExceeded { limit: u64 },

    #[error("staging I/O failure: {0}")]
    StagingIo(#[from] std::io::Error),

    #[error("media probe failed: {stderr}")]
    ProbeFailed { stderr: String },

    #[error("malformed probe output: {0}")]
    MalformedProbeOutput(String),

    #[error("no video stream found in input")]
    NoVideoStream,

    #[error("container rewrite failed: {stderr}")]
    RewriteFailed { stderr: String },

    #[error("storage write failed")]
    StorageWriteFailed(#[source] anyhow::Error),

    #[error("metadata update failed")]
    MetadataUpdateFailed(#[source] anyhow::Error),
}

impl IngestError {
    /// The stage this failure belongs to, for logs and metrics.
    pub fn stage(&self) -> IngestStage {
        match self {
            IngestError::SizeExceeded { .. } | IngestError::StagingIo(_) => IngestStage::Staging,
            IngestError::ProbeFailed { .. }
            | IngestError::MalformedProbeOutput(_)
            | IngestError::NoVideoStream => IngestStage::Probing,
            IngestError::RewriteFailed { .. } => IngestStage::Rewriting,
            IngestError::StorageWriteFailed(_) => IngestStage::Uploading,
            IngestError::MetadataUpdateFailed(_) => IngestStage::Finalizing,
        }
    }
}
