#![deny(unreachable_patterns)]
//! Media post-processing over the FFmpeg CLI.
//!
//! This crate provides:
//! - Remote media download with redirect following and fail-fast fan-out
//! - FFprobe duration and frame-size inspection
//! - Trim, mux and chroma-key composite transforms
//! - Overlay geometry for compositing
//! - Scoped temporary assets named by a per-run id
//! - The `merge` and `replace_background` pipelines built from the above

pub mod asset;
pub mod command;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod metrics;
pub mod pipeline;
pub mod probe;
pub mod tools;
pub mod transform;

pub use asset::{AssetRole, RunWorkspace, TempAsset};
pub use command::{FfmpegCommand, ToolOutput, ToolRunner};
pub use config::{EncodingConfig, MediaConfig};
pub use error::{MediaError, MediaResult};
pub use fetch::{FetchJob, MediaFetcher};
pub use geometry::OverlayGeometry;
pub use pipeline::{Pipeline, PipelineOutput, TrimPlan};
pub use probe::{probe_duration, probe_video_size};
pub use tools::{check_toolchain, FfmpegTools, MediaTools, ToolchainStatus};
pub use transform::{ChromaKey, CHROMA_KEY};
