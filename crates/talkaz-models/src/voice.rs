//! Voice design, cloning and speech schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to design a voice from a text description.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct VoiceGenerateRequest {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
    #[validate(length(min = 1, max = 1000))]
    pub voice_description: String,
}

/// One generated voice sample, stored in the upload directory.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VoiceSample {
    pub id: String,
    pub audio_url: String,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VoiceGenerateResponse {
    pub samples: Vec<VoiceSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VoiceCloneResponse {
    pub voice_id: String,
}

/// Request to speak a line with a cloned voice.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct VoiceCloneGenerateRequest {
    #[validate(length(min = 1, max = 128))]
    pub voice_id: String,
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VoiceCloneGenerateResponse {
    pub audio_url: String,
}
