//! Language-model authored prompt sections.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::CharacterStyle;

/// The two video-prompt sections authored from a scene description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PromptSections {
    pub animation_instructions: String,
    pub hand_arm_gestures: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct PromptSectionsRequest {
    #[validate(length(min = 1, max = 2000))]
    pub spoken_line: String,
    #[validate(length(min = 1, max = 2000))]
    pub scene_description: String,
    #[serde(default)]
    pub style: CharacterStyle,
}
