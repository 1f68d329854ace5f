//! Image upload and stylization schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Response for a stored upload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageUploadResponse {
    pub id: String,
    pub url: String,
}

/// Request to stylize a previously uploaded photo.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ImageGenerateRequest {
    /// URL returned by the upload endpoint.
    #[validate(length(min = 1, max = 2048))]
    pub source_image_url: String,
    /// Built-in style id/name, or a free-text prompt.
    #[validate(length(min = 1, max = 5000))]
    pub style_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageGenerateResponse {
    pub output_url: String,
}
