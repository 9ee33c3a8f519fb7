//! Object storage backends for finished media.
//!
//! The `Storage` trait is the only surface the rest of the workspace sees;
//! backends exist for S3 (and S3-compatible providers) and the local
//! filesystem. Keys are opaque path-like strings produced by the
//! ingestion pipeline, e.g. `landscape/{token}`.

pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
