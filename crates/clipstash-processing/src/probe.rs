//! Geometry probing via ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::IngestError;
use crate::traits::MediaProber;

/// Width and height of the first video stream in a probed file.
/// Both dimensions are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// One stream record from ffprobe. Non-video streams carry no dimensions.
#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Pick the first video-typed stream out of ffprobe's JSON and validate
/// its dimensions. Pure, so it is testable without spawning ffprobe.
pub fn geometry_from_probe_output(raw: &[u8]) -> Result<StreamGeometry, IngestError> {
    let parsed: ProbeOutput = serde_json::from_slice(raw)
        .map_err(|e| IngestError::MalformedProbeOutput(e.to_string()))?;

    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(IngestError::NoVideoStream)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Ok(StreamGeometry { width, height })
        }
        _ => Err(IngestError::MalformedProbeOutput(
            "video stream is missing valid dimensions".to_string(),
        )),
    }
}

/// Prober backed by the ffprobe binary.
pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(process.command = "ffprobe"))]
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, IngestError> {
        let child = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| IngestError::ProbeFailed {
                stderr: format!("ffprobe timed out after {:?}", self.timeout),
            })?
            .map_err(|e| IngestError::ProbeFailed {
                stderr: format!("failed to spawn ffprobe: {e}"),
            })?;

        if !output.status.success() {
            return Err(IngestError::ProbeFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let geometry = geometry_from_probe_output(&output.stdout)?;
        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            "Probe completed"
        );
        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_video_stream_wins_and_audio_is_ignored() {
        let raw = br#"{
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 640, "height": 480},
                {"codec_type": "video", "width": 320, "height": 240}
            ]
        }"#;
        let geometry = geometry_from_probe_output(raw).unwrap();
        assert_eq!(
            geometry,
            StreamGeometry {
                width: 640,
                height: 480
            }
        );
    }

    #[test]
    fn no_video_stream_is_reported_as_such() {
        let raw = br#"{"streams": [{"codec_type": "audio"}, {"codec_type": "subtitle"}]}"#;
        assert!(matches!(
            geometry_from_probe_output(raw),
            Err(IngestError::NoVideoStream)
        ));

        let raw = br#"{"streams": []}"#;
        assert!(matches!(
            geometry_from_probe_output(raw),
            Err(IngestError::NoVideoStream)
        ));
    }

    #[test]
    fn unparseable_output_is_malformed() {
        assert!(matches!(
            geometry_from_probe_output(b"not json"),
            Err(IngestError::MalformedProbeOutput(_))
        ));
    }

    #[test]
    fn video_stream_without_dimensions_is_malformed() {
        let raw = br#"{"streams": [{"codec_type": "video"}]}"#;
        assert!(matches!(
            geometry_from_probe_output(raw),
            Err(IngestError::MalformedProbeOutput(_))
        ));

        let raw = br#"{"streams": [{"codec_type": "video", "width": 0, "height": 480}]}"#;
        assert!(matches!(
            geometry_from_probe_output(raw),
            Err(IngestError::MalformedProbeOutput(_))
        ));
    }
}
