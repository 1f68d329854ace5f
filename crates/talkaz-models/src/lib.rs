//! Shared data models for the Talkaz backend.
//!
//! This crate provides Serde-serializable types for:
//! - Pipeline runs and their stage state machine
//! - Request/response schemas for the image, video, voice and prompt APIs
//! - Stable error codes surfaced to clients
//! - The static style and room catalogs

pub mod catalog;
pub mod error_code;
pub mod image;
pub mod prompt;
pub mod run;
pub mod video;
pub mod voice;

// Re-export common types
pub use catalog::{CharacterStyle, Room, StyleInfo, ROOMS, STYLES};
pub use error_code::ErrorCode;
pub use image::{ImageGenerateRequest, ImageGenerateResponse, ImageUploadResponse};
pub use prompt::{PromptSections, PromptSectionsRequest};
pub use run::{RunId, RunOperation, RunStage, StageTransitionError};
pub use video::{
    BackgroundReplaceRequest, BackgroundReplaceResponse, LipSyncRequest, LipSyncResponse,
    MergeRequest, MergeResponse, PredictionStatus, VideoGenerateRequest, VideoGenerateResponse,
    VideoStatusResponse, DEFAULT_FOREGROUND_SCALE, DEFAULT_VIDEO_DURATION_SECS,
};
pub use voice::{
    VoiceCloneGenerateRequest, VoiceCloneGenerateResponse, VoiceCloneResponse,
    VoiceGenerateRequest, VoiceGenerateResponse, VoiceSample,
};
