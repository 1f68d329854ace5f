//! Upload directory storage.
//!
//! This crate provides:
//! - Saving uploaded and generated bytes under generated filenames
//! - Mapping stored files to public `/uploads/<filename>` paths
//! - Resolving public URLs back to files, rejecting path traversal

pub mod config;
pub mod error;
pub mod store;

pub use config::{StorageConfig, PUBLIC_PREFIX};
pub use error::{StorageError, StorageResult};
pub use store::{StoredFile, UploadStore};
