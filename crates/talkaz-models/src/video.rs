//! Video generation, lip-sync, merge and background replacement schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::catalog::CharacterStyle;
use crate::prompt::PromptSections;

/// Default foreground scale for background replacement.
pub const DEFAULT_FOREGROUND_SCALE: f64 = 0.6;

/// Default clip length requested from the video model.
pub const DEFAULT_VIDEO_DURATION_SECS: f64 = 5.0;

fn default_scale() -> f64 {
    DEFAULT_FOREGROUND_SCALE
}

fn default_duration() -> f64 {
    DEFAULT_VIDEO_DURATION_SECS
}

/// Request to merge a generated video with a voice line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct MergeRequest {
    #[validate(url)]
    pub video_url: String,
    #[validate(url)]
    pub audio_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MergeResponse {
    pub output_url: String,
}

/// Request to composite a green-screen video over a still background.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct BackgroundReplaceRequest {
    #[validate(url)]
    pub video_url: String,
    #[validate(url)]
    pub background_url: String,
    /// Foreground size relative to the frame, in `(0, 1]`.
    #[serde(default = "default_scale")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundReplaceResponse {
    pub output_url: String,
}

/// Request to animate a stylized character image.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct VideoGenerateRequest {
    #[validate(url)]
    pub image_url: String,
    /// The line the character speaks.
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,
    #[serde(default = "default_duration")]
    #[validate(range(min = 1.0, max = 10.0))]
    pub duration: f64,
    #[serde(default)]
    pub style: CharacterStyle,
    /// Optional free-text scene description used to author gesture sections.
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub scene_description: Option<String>,
    /// Pre-authored prompt sections; take precedence over `scene_description`.
    #[serde(default)]
    pub sections: Option<PromptSections>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoGenerateResponse {
    pub prediction_id: String,
    pub status: PredictionStatus,
}

/// Status of an asynchronous prediction on the video provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
        }
    }

    /// Check if the prediction will no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoStatusResponse {
    pub status: PredictionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct LipSyncRequest {
    #[validate(url)]
    pub video_url: String,
    #[validate(url)]
    pub audio_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LipSyncResponse {
    pub output_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_request_defaults_scale() {
        let req: BackgroundReplaceRequest = serde_json::from_str(
            r#"{"video_url":"https://cdn.example.com/a.mp4","background_url":"https://cdn.example.com/bg.jpg"}"#,
        )
        .unwrap();
        assert!((req.scale - 0.6).abs() < f64::EPSILON);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_background_request_rejects_out_of_range_scale() {
        for scale in [0.0, -0.5, 1.5] {
            let req = BackgroundReplaceRequest {
                video_url: "https://cdn.example.com/a.mp4".to_string(),
                background_url: "https://cdn.example.com/bg.jpg".to_string(),
                scale,
            };
            assert!(req.validate().is_err(), "scale {scale} should be rejected");
        }
    }

    #[test]
    fn test_merge_request_rejects_non_url() {
        let req = MergeRequest {
            video_url: "not a url".to_string(),
            audio_url: "https://cdn.example.com/a.mp3".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_video_generate_defaults() {
        let req: VideoGenerateRequest = serde_json::from_str(
            r#"{"image_url":"https://cdn.example.com/c.png","prompt":"What's up?"}"#,
        )
        .unwrap();
        assert!((req.duration - 5.0).abs() < f64::EPSILON);
        assert_eq!(req.style, CharacterStyle::Ps2);
        assert!(req.sections.is_none());
    }

    #[test]
    fn test_prediction_status() {
        let status: PredictionStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(status, PredictionStatus::Processing);
        assert!(!status.is_terminal());
        assert!(PredictionStatus::Succeeded.is_terminal());
        assert!(PredictionStatus::Canceled.is_terminal());
    }
}
