//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. `HttpAppError`
//! wraps `AppError` (orphan rules keep us from implementing IntoResponse on
//! it directly) and renders the client-safe message from `ErrorMetadata`.
//! Full diagnostics, including tool stderr carried by `IngestError`, go to
//! the logs only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use clipstash_core::{AppError, ErrorMetadata, LogLevel};
use clipstash_processing::IngestError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<IngestError> for HttpAppError {
    fn from(err: IngestError) -> Self {
        let stage = err.stage().as_str();
        let mapped = match &err {
            IngestError::SizeExceeded { limit } => {
                AppError::PayloadTooLarge(format!("Upload exceeds the {limit}-byte limit"))
            }
            IngestError::NoVideoStream => {
                AppError::BadRequest("The uploaded file contains no video stream".to_string())
            }
            IngestError::MalformedProbeOutput(_) => {
                AppError::BadRequest("The uploaded file could not be read as media".to_string())
            }
            IngestError::StorageWriteFailed(_) => AppError::Storage(err.to_string()),
            IngestError::MetadataUpdateFailed(_) => {
                AppError::Internal(format!("ingest {stage} failed: {err}"))
            }
            IngestError::StagingIo(_)
            | IngestError::ProbeFailed { .. }
            | IngestError::RewriteFailed { .. } => {
                AppError::MediaProcessing(format!("ingest {stage} failed: {err}"))
            }
        };
        HttpAppError(mapped)
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal detail is logged here and nowhere else.
        match self.0.log_level() {
            LogLevel::Debug => tracing::debug!(error = ?self.0, "Request failed"),
            LogLevel::Warn => tracing::warn!(error = ?self.0, "Request failed"),
            LogLevel::Error => tracing::error!(error = ?self.0, "Request failed"),
        }

        let body = ErrorResponse {
            error: self.0.client_message(),
            code: self.0.error_code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_exceeded_becomes_413() {
        let err: HttpAppError = IngestError::SizeExceeded { limit: 1024 }.into();
        assert_eq!(err.0.http_status_code(), 413);
    }

    #[test]
    fn tool_stderr_never_reaches_the_client() {
        let err: HttpAppError = IngestError::RewriteFailed {
            stderr: "/tmp/ingest-abc/upload.mp4: moov atom not found".to_string(),
        }
        .into();
        let message = err.0.client_message();
        assert!(!message.contains("moov"));
        assert!(!message.contains("/tmp"));
    }

    #[test]
    fn no_video_stream_is_a_client_error() {
        let err: HttpAppError = IngestError::NoVideoStream.into();
        assert_eq!(err.0.http_status_code(), 400);
    }
}
