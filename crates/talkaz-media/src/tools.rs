//! The media toolchain seam.
//!
//! Pipelines talk to FFmpeg and FFprobe through the [`MediaTools`] trait so
//! orchestration can be tested without a real transcoder.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::command::ToolRunner;
use crate::config::{EncodingConfig, MediaConfig};
use crate::error::MediaResult;
use crate::geometry::OverlayGeometry;
use crate::{probe, transform};

/// Probing and transforming operations a pipeline run needs.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Container duration in seconds (> 0).
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;

    /// First video stream's `(width, height)`.
    async fn probe_video_size(&self, path: &Path) -> MediaResult<(u32, u32)>;

    /// Stream-copy cut of `input` to `duration` seconds.
    async fn trim(&self, input: &Path, duration: f64, output: &Path) -> MediaResult<()>;

    /// Copy `video`'s picture and re-encode `audio` into `output`.
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<()>;

    /// Chroma-key `foreground` over a still `background`.
    async fn composite(
        &self,
        foreground: &Path,
        background: &Path,
        output: &Path,
        geometry: &OverlayGeometry,
    ) -> MediaResult<()>;
}

/// [`MediaTools`] backed by the FFmpeg and FFprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: ToolRunner,
    ffprobe: ToolRunner,
    encoding: EncodingConfig,
}

impl FfmpegTools {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            ffmpeg: ToolRunner::new(&config.ffmpeg_path).with_timeout(config.transcode_timeout),
            ffprobe: ToolRunner::new(&config.ffprobe_path).with_timeout(config.probe_timeout),
            encoding: config.encoding.clone(),
        }
    }
}

#[async_trait]
impl MediaTools for FfmpegTools {
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        probe::probe_duration(&self.ffprobe, path).await
    }

    async fn probe_video_size(&self, path: &Path) -> MediaResult<(u32, u32)> {
        probe::probe_video_size(&self.ffprobe, path).await
    }

    async fn trim(&self, input: &Path, duration: f64, output: &Path) -> MediaResult<()> {
        let cmd = transform::trim_command(input, duration, output);
        transform::run_transcode(&self.ffmpeg, "trim", &cmd).await
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<()> {
        let cmd = transform::mux_command(video, audio, output, &self.encoding);
        transform::run_transcode(&self.ffmpeg, "mux", &cmd).await
    }

    async fn composite(
        &self,
        foreground: &Path,
        background: &Path,
        output: &Path,
        geometry: &OverlayGeometry,
    ) -> MediaResult<()> {
        let cmd =
            transform::composite_command(foreground, background, output, geometry, &self.encoding);
        transform::run_transcode(&self.ffmpeg, "chromakey", &cmd).await
    }
}

/// Resolved locations of the media binaries.
#[derive(Debug, Clone, Default)]
pub struct ToolchainStatus {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

impl ToolchainStatus {
    pub fn is_ready(&self) -> bool {
        self.ffmpeg.is_some() && self.ffprobe.is_some()
    }

    /// Names of the binaries that could not be resolved.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.ffmpeg.is_none() {
            missing.push("ffmpeg");
        }
        if self.ffprobe.is_none() {
            missing.push("ffprobe");
        }
        missing
    }
}

/// Resolve `ffmpeg` and `ffprobe` on PATH (or at their configured paths).
pub fn check_toolchain(config: &MediaConfig) -> ToolchainStatus {
    let resolve = |program: &Path| match which::which(program) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(program = %program.display(), error = %e, "Media tool not found");
            None
        }
    };

    ToolchainStatus {
        ffmpeg: resolve(config.ffmpeg_path.as_path()),
        ffprobe: resolve(config.ffprobe_path.as_path()),
    }
}
