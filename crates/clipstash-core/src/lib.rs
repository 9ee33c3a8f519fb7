//! Core domain types shared across the clipstash workspace: the unified
//! error type, env-driven configuration, and the video record models.

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
