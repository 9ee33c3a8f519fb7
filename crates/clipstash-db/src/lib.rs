//! Postgres persistence for the video catalog.

pub mod videos;

pub use videos::VideoRepository;

use sqlx::PgPool;

/// Run embedded migrations against the given pool.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
