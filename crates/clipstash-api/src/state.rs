//! Application state shared by all handlers.

use std::sync::Arc;

use clipstash_db::VideoRepository;
use clipstash_processing::IngestPipeline;

pub struct AppState {
    pub videos: VideoRepository,
    pub pipeline: Arc<IngestPipeline>,
}
