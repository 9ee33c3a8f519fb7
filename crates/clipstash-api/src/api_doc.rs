//! OpenAPI documentation aggregation.

use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::videos::create_video,
        crate::handlers::videos::get_video,
        crate::handlers::video_upload::upload_video_media,
    ),
    components(schemas(
        clipstash_core::models::VideoResponse,
        crate::handlers::videos::CreateVideoRequest,
        crate::error::ErrorResponse,
    )),
    tags((name = "videos", description = "Video catalog and media ingestion"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
