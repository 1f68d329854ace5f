//! Video generation, lip-sync and post-processing handlers.

use axum::extract::{Path, State};
use axum::Json;
use tracing::{debug, info, warn};

use talkaz_models::{
    BackgroundReplaceRequest, BackgroundReplaceResponse, LipSyncRequest, LipSyncResponse,
    MergeRequest, MergeResponse, PredictionStatus, PromptSections, VideoGenerateRequest,
    VideoGenerateResponse, VideoStatusResponse,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::{PublicOrigin, ValidatedJson};
use crate::state::AppState;

/// Longest prediction id accepted on the status route.
const MAX_PREDICTION_ID_LEN: usize = 128;

/// Start an image-to-video prediction.
///
/// Explicit `sections` win. Otherwise, when a scene description is given and
/// the language model is configured, sections are authored from it; a failure
/// there falls back to the default sections rather than failing the request.
pub async fn generate_video(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VideoGenerateRequest>,
) -> ApiResult<Json<VideoGenerateResponse>> {
    let sections = match request.sections.clone() {
        Some(sections) => Some(sections),
        None => author_sections(&state, &request).await,
    };

    let prediction = state
        .replicate
        .create_video_prediction(
            &request.image_url,
            &request.prompt,
            request.duration,
            request.style,
            sections.as_ref(),
        )
        .await?;

    info!(
        prediction_id = %prediction.id,
        status = %prediction.status,
        style = %request.style,
        authored_sections = sections.is_some(),
        "Video prediction started"
    );

    Ok(Json(VideoGenerateResponse {
        prediction_id: prediction.id,
        status: prediction.status,
    }))
}

async fn author_sections(state: &AppState, request: &VideoGenerateRequest) -> Option<PromptSections> {
    let scene = request
        .scene_description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    if !state.prompts.is_configured() {
        debug!("Scene description given but no language model configured; using default sections");
        return None;
    }

    match state
        .prompts
        .generate_prompt_sections(&request.prompt, scene, request.style)
        .await
    {
        Ok(sections) => Some(sections),
        Err(e) => {
            warn!(error = %e, "Prompt section authoring failed; using default sections");
            None
        }
    }
}

/// Poll a video prediction.
pub async fn get_video_status(
    State(state): State<AppState>,
    Path(prediction_id): Path<String>,
) -> ApiResult<Json<VideoStatusResponse>> {
    if prediction_id.is_empty()
        || prediction_id.len() > MAX_PREDICTION_ID_LEN
        || !prediction_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::bad_request("Invalid prediction id"));
    }

    let prediction = state.replicate.get_prediction(&prediction_id).await?;
    let output_url = match prediction.status {
        PredictionStatus::Succeeded => prediction.output_url(),
        _ => None,
    };

    Ok(Json(VideoStatusResponse {
        status: prediction.status,
        output_url,
        error: prediction.error_message(),
    }))
}

/// Lip-sync a video to an audio line on the provider.
pub async fn lip_sync(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LipSyncRequest>,
) -> ApiResult<Json<LipSyncResponse>> {
    let output_url = state
        .replicate
        .lip_sync(&request.video_url, &request.audio_url)
        .await?;
    Ok(Json(LipSyncResponse { output_url }))
}

/// Trim a video to a voice line and mux them.
pub async fn merge_video(
    State(state): State<AppState>,
    origin: PublicOrigin,
    ValidatedJson(request): ValidatedJson<MergeRequest>,
) -> ApiResult<Json<MergeResponse>> {
    let output = state
        .pipeline
        .merge(&request.video_url, &request.audio_url)
        .await?;
    let output_url = origin.url_for(&state.store.public_path(&output.filename));

    info!(run_id = %output.run_id, output = %output.filename, "Merge delivered");
    Ok(Json(MergeResponse { output_url }))
}

/// Composite a green-screen video over a still background.
pub async fn apply_background(
    State(state): State<AppState>,
    origin: PublicOrigin,
    ValidatedJson(request): ValidatedJson<BackgroundReplaceRequest>,
) -> ApiResult<Json<BackgroundReplaceResponse>> {
    let output = state
        .pipeline
        .replace_background(&request.video_url, &request.background_url, request.scale)
        .await?;
    let output_url = origin.url_for(&state.store.public_path(&output.filename));

    info!(run_id = %output.run_id, output = %output.filename, "Background replacement delivered");
    Ok(Json(BackgroundReplaceResponse { output_url }))
}
