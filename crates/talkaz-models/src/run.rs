//! Pipeline run identity and stage tracking.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a pipeline run.
///
/// Used as the filename prefix for every asset the run creates, so two runs
/// sharing an upload directory never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The orchestrated workflow a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunOperation {
    /// Trim video to audio length, then mux.
    Merge,
    /// Chroma-key composite over a still background.
    ReplaceBackground,
}

impl RunOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOperation::Merge => "merge",
            RunOperation::ReplaceBackground => "replace_background",
        }
    }
}

impl fmt::Display for RunOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of a single pipeline run.
///
/// ```text
/// Pending -> Downloading -> Probing -> Transforming -> Done
///    \___________\______________\___________\-------> Failed
/// ```
///
/// Nothing is retried; a failed run starts over from `Pending` under a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    #[default]
    Pending,
    Downloading,
    Probing,
    Transforming,
    Done,
    Failed,
}

/// Rejected stage transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid run stage transition: {from} -> {to}")]
pub struct StageTransitionError {
    pub from: RunStage,
    pub to: RunStage,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Pending => "pending",
            RunStage::Downloading => "downloading",
            RunStage::Probing => "probing",
            RunStage::Transforming => "transforming",
            RunStage::Done => "done",
            RunStage::Failed => "failed",
        }
    }

    /// Check if this is a terminal stage (no more transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStage::Done | RunStage::Failed)
    }

    /// The stage that follows this one on the success path.
    pub fn next(&self) -> Option<RunStage> {
        match self {
            RunStage::Pending => Some(RunStage::Downloading),
            RunStage::Downloading => Some(RunStage::Probing),
            RunStage::Probing => Some(RunStage::Transforming),
            RunStage::Transforming => Some(RunStage::Done),
            RunStage::Done | RunStage::Failed => None,
        }
    }

    /// Validate and perform a transition to `to`.
    pub fn transition(self, to: RunStage) -> Result<RunStage, StageTransitionError> {
        let allowed = match to {
            RunStage::Failed => !self.is_terminal(),
            _ => self.next() == Some(to),
        };

        if allowed {
            Ok(to)
        } else {
            Err(StageTransitionError { from: self, to })
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
