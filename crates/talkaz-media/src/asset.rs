//! Per-run temporary assets with guaranteed cleanup.
//!
//! A [`RunWorkspace`] owns a run id and hands out [`TempAsset`] guards named
//! `<run_id>_<role>.<ext>` inside the upload directory. Dropping a guard
//! deletes its file, so every exit path of a run (success, error, or a
//! dropped future) removes the intermediates. The final deliverable is
//! released with [`TempAsset::keep`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use talkaz_models::RunId;

use crate::error::MediaResult;

/// Role of an asset within a run; becomes the filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRole {
    Video,
    Audio,
    Trimmed,
    Merged,
    Background,
    Final,
}

impl AssetRole {
    pub fn suffix(&self) -> &'static str {
        match self {
            AssetRole::Video => "video",
            AssetRole::Audio => "audio",
            AssetRole::Trimmed => "trimmed",
            AssetRole::Merged => "merged",
            AssetRole::Background => "background",
            AssetRole::Final => "final",
        }
    }
}

/// Filename namespace for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    run_id: RunId,
    dir: PathBuf,
}

impl RunWorkspace {
    /// Create a workspace with a fresh run id, creating `dir` if needed.
    pub async fn create(dir: impl AsRef<Path>) -> MediaResult<Self> {
        Self::with_run_id(dir, RunId::new()).await
    }

    /// Create a workspace for an existing run id.
    pub async fn with_run_id(dir: impl AsRef<Path>, run_id: RunId) -> MediaResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { run_id, dir })
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filename for `role` with extension `ext`.
    pub fn filename(&self, role: AssetRole, ext: &str) -> String {
        format!(
            "{}_{}.{}",
            self.run_id,
            role.suffix(),
            ext.trim_start_matches('.')
        )
    }

    /// Reserve a guarded path for `role`. The file itself is not created.
    pub fn asset(&self, role: AssetRole, ext: &str) -> TempAsset {
        TempAsset::new(self.dir.join(self.filename(role, ext)))
    }
}

/// Drop guard that deletes its file unless [`keep`](TempAsset::keep) was called.
#[derive(Debug)]
pub struct TempAsset {
    path: PathBuf,
    keep: bool,
}

impl TempAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Disarm the guard and return the retained path.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for TempAsset {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed temporary asset"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove temporary asset"
            ),
        }
    }
}
