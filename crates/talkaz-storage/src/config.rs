//! Storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// URL path prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Configuration for the upload store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding every stored file
    pub upload_dir: PathBuf,
    /// Public path prefix (no trailing slash)
    pub public_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            public_prefix: PUBLIC_PREFIX.to_string(),
        }
    }
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            ..defaults
        }
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }
}
