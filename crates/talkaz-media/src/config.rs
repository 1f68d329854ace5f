//! Media pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default codec for re-encoded composites (H.264).
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default encoding preset.
pub const DEFAULT_PRESET: &str = "veryfast";
/// Default CRF for composites.
pub const DEFAULT_CRF: u8 = 20;
/// Codec the muxed voice line is re-encoded to.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Bitrate for the re-encoded voice line.
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";

/// Video encoding settings for steps that cannot stream-copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfig {
    pub codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
        }
    }
}

/// Configuration for the media pipeline.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory that holds run assets and final deliverables
    pub upload_dir: PathBuf,
    /// FFmpeg binary (name resolved on PATH, or absolute path)
    pub ffmpeg_path: PathBuf,
    /// FFprobe binary
    pub ffprobe_path: PathBuf,
    /// Whole-request timeout for a single download
    pub fetch_timeout: Duration,
    /// Timeout for each ffprobe invocation
    pub probe_timeout: Duration,
    /// Timeout for each ffmpeg invocation
    pub transcode_timeout: Duration,
    pub encoding: EncodingConfig,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            fetch_timeout: Duration::from_secs(120),
            probe_timeout: Duration::from_secs(30),
            transcode_timeout: Duration::from_secs(600),
            encoding: EncodingConfig::default(),
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            ffmpeg_path: std::env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: std::env::var("FFPROBE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffprobe_path),
            fetch_timeout: env_secs("FETCH_TIMEOUT_SECS").unwrap_or(defaults.fetch_timeout),
            probe_timeout: env_secs("PROBE_TIMEOUT_SECS").unwrap_or(defaults.probe_timeout),
            transcode_timeout: env_secs("TRANSCODE_TIMEOUT_SECS")
                .unwrap_or(defaults.transcode_timeout),
            encoding: EncodingConfig {
                codec: std::env::var("VIDEO_CODEC").unwrap_or(defaults.encoding.codec),
                preset: std::env::var("VIDEO_PRESET").unwrap_or(defaults.encoding.preset),
                crf: std::env::var("VIDEO_CRF")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.encoding.crf),
                ..defaults.encoding
            },
        }
    }

    /// Override the upload directory.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}
