//! Prompt-section authoring handler.

use axum::extract::State;
use axum::Json;

use talkaz_models::{PromptSections, PromptSectionsRequest};

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::state::AppState;

/// Author animation and gesture sections from a scene description.
pub async fn generate_sections(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PromptSectionsRequest>,
) -> ApiResult<Json<PromptSections>> {
    let sections = state
        .prompts
        .generate_prompt_sections(&request.spoken_line, &request.scene_description, request.style)
        .await?;
    Ok(Json(sections))
}
