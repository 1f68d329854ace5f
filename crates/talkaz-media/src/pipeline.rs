//! The `merge` and `replace_background` pipelines.
//!
//! A run moves through `Pending -> Downloading -> Probing -> Transforming ->
//! Done`, or to `Failed` from any of those. Every file a run creates is a
//! [`TempAsset`] guard, so intermediates are deleted on every exit path and
//! only the final deliverable survives a successful run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

use talkaz_models::{RunId, RunOperation, RunStage};

use crate::asset::{AssetRole, RunWorkspace, TempAsset};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::fetch::{extension_from_url, validate_url, FetchJob, MediaFetcher};
use crate::geometry::{validate_scale, OverlayGeometry};
use crate::metrics;
use crate::tools::{FfmpegTools, MediaTools};

/// Final deliverable of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run_id: RunId,
    pub path: PathBuf,
    pub filename: String,
}

impl PipelineOutput {
    fn from_asset(run_id: &RunId, asset: TempAsset) -> Self {
        let filename = asset.filename();
        Self {
            run_id: run_id.clone(),
            path: asset.keep(),
            filename,
        }
    }
}

/// How far the video is cut before muxing.
///
/// The target is the audio length, clamped to the video length when the
/// video is shorter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimPlan {
    pub duration: f64,
    pub clamped: bool,
}

impl TrimPlan {
    pub fn new(audio_secs: f64, video_secs: f64) -> Self {
        if video_secs < audio_secs {
            Self {
                duration: video_secs,
                clamped: true,
            }
        } else {
            Self {
                duration: audio_secs,
                clamped: false,
            }
        }
    }
}

/// Stage bookkeeping for one run: validated transitions, logs and metrics.
///
/// A tracker dropped before reaching a terminal stage (the run future was
/// cancelled) records the run as failed.
struct RunTracker {
    operation: RunOperation,
    run_id: RunId,
    stage: RunStage,
    stage_started: Instant,
}

impl RunTracker {
    fn new(operation: RunOperation, run_id: RunId) -> Self {
        Self {
            operation,
            run_id,
            stage: RunStage::Pending,
            stage_started: Instant::now(),
        }
    }

    fn advance(&mut self, to: RunStage) -> MediaResult<()> {
        let next = self.stage.transition(to)?;
        metrics::record_stage_duration(
            self.operation,
            self.stage,
            self.stage_started.elapsed().as_secs_f64(),
        );
        info!(from = %self.stage, to = %next, "Run stage changed");

        self.stage = next;
        self.stage_started = Instant::now();
        if next.is_terminal() {
            metrics::record_run(self.operation, next);
        }
        Ok(())
    }

    fn fail(&mut self, err: &MediaError) {
        if self.stage.is_terminal() {
            return;
        }
        error!(stage = %self.stage, code = %err.code(), error = %err, "Run failed");
        // Failed is reachable from every non-terminal stage.
        let _ = self.advance(RunStage::Failed);
    }
}

impl Drop for RunTracker {
    fn drop(&mut self) {
        if !self.stage.is_terminal() {
            warn!(
                run_id = %self.run_id,
                operation = %self.operation,
                stage = %self.stage,
                "Run dropped before completion"
            );
            let _ = self.advance(RunStage::Failed);
        }
    }
}

/// Orchestrates downloads, probes and transforms for one upload directory.
#[derive(Clone)]
pub struct Pipeline {
    tools: Arc<dyn MediaTools>,
    fetcher: MediaFetcher,
    upload_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        tools: Arc<dyn MediaTools>,
        fetcher: MediaFetcher,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tools,
            fetcher,
            upload_dir: upload_dir.into(),
        }
    }

    /// Build a pipeline backed by FFmpeg from configuration.
    pub fn from_config(config: &MediaConfig) -> MediaResult<Self> {
        Ok(Self::new(
            Arc::new(FfmpegTools::new(config)),
            MediaFetcher::new(config.fetch_timeout)?,
            config.upload_dir.clone(),
        ))
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Trim `video_url` to the length of `audio_url` and mux them.
    pub async fn merge(&self, video_url: &str, audio_url: &str) -> MediaResult<PipelineOutput> {
        validate_url(video_url)?;
        validate_url(audio_url)?;

        let workspace = RunWorkspace::create(&self.upload_dir).await?;
        let span = info_span!(
            "pipeline_run",
            run_id = %workspace.run_id(),
            operation = RunOperation::Merge.as_str()
        );

        async {
            let mut tracker = RunTracker::new(RunOperation::Merge, workspace.run_id().clone());
            let result = self
                .run_merge(&workspace, &mut tracker, video_url, audio_url)
                .await;
            if let Err(e) = &result {
                tracker.fail(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_merge(
        &self,
        ws: &RunWorkspace,
        tracker: &mut RunTracker,
        video_url: &str,
        audio_url: &str,
    ) -> MediaResult<PipelineOutput> {
        tracker.advance(RunStage::Downloading)?;
        let video = ws.asset(AssetRole::Video, &extension_from_url(video_url, "mp4"));
        let audio = ws.asset(AssetRole::Audio, &extension_from_url(audio_url, "mp3"));
        self.fetcher
            .fetch_all(&[
                FetchJob::new(video_url, video.path()),
                FetchJob::new(audio_url, audio.path()),
            ])
            .await?;

        tracker.advance(RunStage::Probing)?;
        let (audio_secs, video_secs) = tokio::try_join!(
            self.tools.probe_duration(audio.path()),
            self.tools.probe_duration(video.path()),
        )?;
        let plan = TrimPlan::new(audio_secs, video_secs);
        if plan.clamped {
            warn!(
                audio_secs,
                video_secs, "Video is shorter than audio, trimming to video length"
            );
        }

        tracker.advance(RunStage::Transforming)?;
        let trimmed = ws.asset(AssetRole::Trimmed, "mp4");
        self.tools
            .trim(video.path(), plan.duration, trimmed.path())
            .await?;
        drop(video);

        let merged = ws.asset(AssetRole::Merged, "mp4");
        self.tools
            .mux(trimmed.path(), audio.path(), merged.path())
            .await?;
        drop(trimmed);
        drop(audio);

        tracker.advance(RunStage::Done)?;
        let output = PipelineOutput::from_asset(ws.run_id(), merged);
        info!(filename = %output.filename, duration = plan.duration, "Merge completed");
        Ok(output)
    }

    /// Chroma-key `video_url` over the still `background_url` at `scale`.
    pub async fn replace_background(
        &self,
        video_url: &str,
        background_url: &str,
        scale: f64,
    ) -> MediaResult<PipelineOutput> {
        validate_url(video_url)?;
        validate_url(background_url)?;
        validate_scale(scale)?;

        let workspace = RunWorkspace::create(&self.upload_dir).await?;
        let span = info_span!(
            "pipeline_run",
            run_id = %workspace.run_id(),
            operation = RunOperation::ReplaceBackground.as_str()
        );

        async {
            let mut tracker =
                RunTracker::new(RunOperation::ReplaceBackground, workspace.run_id().clone());
            let result = self
                .run_replace_background(&workspace, &mut tracker, video_url, background_url, scale)
                .await;
            if let Err(e) = &result {
                tracker.fail(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_replace_background(
        &self,
        ws: &RunWorkspace,
        tracker: &mut RunTracker,
        video_url: &str,
        background_url: &str,
        scale: f64,
    ) -> MediaResult<PipelineOutput> {
        tracker.advance(RunStage::Downloading)?;
        let video = ws.asset(AssetRole::Video, &extension_from_url(video_url, "mp4"));
        let background = ws.asset(
            AssetRole::Background,
            &extension_from_url(background_url, "jpg"),
        );
        self.fetcher
            .fetch_all(&[
                FetchJob::new(video_url, video.path()),
                FetchJob::new(background_url, background.path()),
            ])
            .await?;

        tracker.advance(RunStage::Probing)?;
        let (width, height) = self.tools.probe_video_size(video.path()).await?;
        let geometry = OverlayGeometry::compute(width, height, scale)?;
        info!(
            width,
            height,
            fg_width = geometry.fg_width,
            fg_height = geometry.fg_height,
            x = geometry.x,
            y = geometry.y,
            "Computed overlay geometry"
        );

        tracker.advance(RunStage::Transforming)?;
        let output = ws.asset(AssetRole::Final, "mp4");
        self.tools
            .composite(video.path(), background.path(), output.path(), &geometry)
            .await?;
        drop(video);
        drop(background);

        tracker.advance(RunStage::Done)?;
        let output = PipelineOutput::from_asset(ws.run_id(), output);
        info!(filename = %output.filename, "Background replacement completed");
        Ok(output)
    }
}
