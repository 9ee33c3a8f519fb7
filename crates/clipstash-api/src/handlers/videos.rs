//! Video catalog CRUD handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use clipstash_core::models::VideoResponse;
use clipstash_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 200, description = "Video record created", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVideoRequest>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()).into());
    }

    let video = state
        .videos
        .create_video(req.user_id, req.title, req.description)
        .await?;

    Ok(Json(video.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{video_id}",
    tag = "videos",
    params(("video_id" = Uuid, Path, description = "Video record id")),
    responses(
        (status = 200, description = "Video record", body = VideoResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<Uuid>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {video_id} not found")))?;

    Ok(Json(video.into()))
}
