//! Media ingestion endpoint: streams the raw request body into the
//! pipeline and returns the updated video record.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use futures::StreamExt;
use std::sync::Arc;
use uuid::Uuid;

use clipstash_core::models::VideoResponse;
use clipstash_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/videos/{video_id}/media",
    tag = "videos",
    params(("video_id" = Uuid, Path, description = "Video record to attach media to")),
    request_body(content = Vec<u8>, content_type = "video/mp4"),
    responses(
        (status = 200, description = "Media ingested and record updated", body = VideoResponse),
        (status = 400, description = "Not an ingestable video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "Ingestion failed", body = ErrorResponse)
    )
)]
pub async fn upload_video_media(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<Uuid>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    // Mime parameters (e.g. "; codecs=...") are not part of the essence.
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence != "video/mp4" {
        return Err(
            AppError::BadRequest("Only video/mp4 uploads are accepted".to_string()).into(),
        );
    }

    // The record must exist before any bytes hit the disk.
    state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {video_id} not found")))?;

    let stream = body
        .into_data_stream()
        .map(|chunk| chunk.map_err(std::io::Error::other));

    let outcome = state.pipeline.ingest(video_id, &essence, stream).await?;
    tracing::info!(
        video_id = %video_id,
        storage_key = %outcome.storage_key,
        orientation = %outcome.orientation,
        "Video media ingested"
    );

    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {video_id} not found")))?;

    Ok(Json(video.into()))
}
