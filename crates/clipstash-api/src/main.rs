mod api_doc;
mod error;
mod handlers;
mod media_seams;
mod state;
mod telemetry;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use clipstash_core::Config;
use clipstash_db::VideoRepository;
use clipstash_processing::{FfmpegRewriter, FfprobeProber, IngestPipeline};

use crate::media_seams::{CatalogSeam, StoreSeam};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    clipstash_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let storage = clipstash_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;
    let videos = VideoRepository::new(pool);

    let pipeline = Arc::new(IngestPipeline::new(
        Arc::new(FfprobeProber::new(
            config.ffprobe_path.clone(),
            config.probe_timeout(),
        )),
        Arc::new(FfmpegRewriter::new(
            config.ffmpeg_path.clone(),
            config.rewrite_timeout(),
        )),
        Arc::new(StoreSeam::new(storage)),
        Arc::new(CatalogSeam::new(videos.clone())),
        config.max_upload_bytes,
    ));

    let state = Arc::new(AppState { videos, pipeline });

    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "clipstash-api listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/videos", post(handlers::videos::create_video))
        .route("/api/v1/videos/{video_id}", get(handlers::videos::get_video))
        .route(
            "/api/v1/videos/{video_id}/media",
            post(handlers::video_upload::upload_video_media)
                // The staging stage enforces the size bound; axum's default
                // 2 MB body cap would reject uploads before it could.
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/api/docs/openapi.json", get(api_doc::openapi_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
