//! Fast-start container rewriting via ffmpeg.
//!
//! Stream-copies the input into a new MP4 whose moov atom precedes the
//! sample data, so playback can begin before the whole file downloads.
//! Encoded samples are byte-identical and keep their relative order;
//! this is container reorganization, not transcoding.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::IngestError;
use crate::traits::ContainerRewriter;

/// Rewriter backed by the ffmpeg binary.
pub struct FfmpegRewriter {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRewriter {
    pub fn new(ffmpeg_path: String, timeout: Duration) -> Self {
        Self {
            ffmpeg_path,
            timeout,
        }
    }
}

#[async_trait]
impl ContainerRewriter for FfmpegRewriter {
    #[tracing::instrument(skip(self), fields(process.command = "ffmpeg"))]
    async fn rewrite(&self, input: &Path, output: &Path) -> Result<(), IngestError> {
        let child = Command::new(&self.ffmpeg_path)
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .output();

        let result = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| IngestError::RewriteFailed {
                stderr: format!("ffmpeg timed out after {:?}", self.timeout),
            })?
            .map_err(|e| IngestError::RewriteFailed {
                stderr: format!("failed to spawn ffmpeg: {e}"),
            })?;

        if !result.status.success() {
            return Err(IngestError::RewriteFailed {
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }

        tracing::debug!(output = %output.display(), "Fast-start rewrite completed");
        Ok(())
    }
}
