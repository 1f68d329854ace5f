//! Pipeline metrics.
//!
//! Provides:
//! - Run counters by operation and outcome
//! - Stage duration histograms
//! - Download duration histogram

use metrics::{counter, histogram};

use talkaz_models::{RunOperation, RunStage};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Finished pipeline runs by operation and outcome.
    pub const PIPELINE_RUNS_TOTAL: &str = "talkaz_pipeline_runs_total";

    /// Time spent in each run stage, by operation and stage.
    pub const PIPELINE_STAGE_SECONDS: &str = "talkaz_pipeline_stage_duration_seconds";

    /// Time to download one remote asset.
    pub const DOWNLOAD_DURATION_SECONDS: &str = "talkaz_download_duration_seconds";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a finished run; `outcome` is the terminal stage.
pub fn record_run(operation: RunOperation, outcome: RunStage) {
    counter!(
        names::PIPELINE_RUNS_TOTAL,
        "operation" => operation.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record the time a run spent in `stage`.
pub fn record_stage_duration(operation: RunOperation, stage: RunStage, secs: f64) {
    histogram!(
        names::PIPELINE_STAGE_SECONDS,
        "operation" => operation.as_str(),
        "stage" => stage.as_str()
    )
    .record(secs);
}

/// Record one download, labelled by whether it succeeded.
pub fn record_download_duration(success: bool, secs: f64) {
    histogram!(
        names::DOWNLOAD_DURATION_SECONDS,
        "success" => if success { "true" } else { "false" }
    )
    .record(secs);
}
