//! Voice design, cloning and speech handlers.

use axum::extract::{Multipart, State};
use axum::Json;
use futures_util::future::try_join_all;
use tracing::info;
use uuid::Uuid;

use talkaz_models::{
    VoiceCloneGenerateRequest, VoiceCloneGenerateResponse, VoiceCloneResponse,
    VoiceGenerateRequest, VoiceGenerateResponse, VoiceSample,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::{read_upload, PublicOrigin, ValidatedJson};
use crate::metrics;
use crate::state::AppState;

/// Samples generated per voice design request.
const VOICE_SAMPLE_COUNT: u32 = 3;

/// Design a voice from a description and store each sample as MP3.
pub async fn generate_voice(
    State(state): State<AppState>,
    origin: PublicOrigin,
    ValidatedJson(request): ValidatedJson<VoiceGenerateRequest>,
) -> ApiResult<Json<VoiceGenerateResponse>> {
    let generated = state
        .hume
        .generate_voice_samples(&request.text, &request.voice_description, VOICE_SAMPLE_COUNT)
        .await?;

    let (store, origin) = (&state.store, &origin);
    let saves = generated.iter().map(|sample| async move {
        let stored = store.save_with_extension(&sample.audio, "mp3").await?;
        metrics::record_upload("audio", sample.audio.len());
        Ok::<_, ApiError>(VoiceSample {
            id: sample.id.clone(),
            audio_url: origin.url_for(&stored.public_path),
            duration: sample.duration,
        })
    });
    let samples = try_join_all(saves).await?;

    info!(samples = samples.len(), "Voice samples stored");
    Ok(Json(VoiceGenerateResponse { samples }))
}

/// Create an instant voice clone from an uploaded `audio/*` sample.
pub async fn clone_voice(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<VoiceCloneResponse>> {
    let upload = read_upload(multipart, "audio/").await?;
    let name = clone_name();
    let voice_id = state
        .elevenlabs
        .clone_voice(upload.bytes.to_vec(), &name)
        .await?;
    Ok(Json(VoiceCloneResponse { voice_id }))
}

/// Speak a line with a cloned voice and store the MP3.
pub async fn generate_cloned_voice(
    State(state): State<AppState>,
    origin: PublicOrigin,
    ValidatedJson(request): ValidatedJson<VoiceCloneGenerateRequest>,
) -> ApiResult<Json<VoiceCloneGenerateResponse>> {
    let audio = state
        .elevenlabs
        .text_to_speech(&request.voice_id, &request.text)
        .await?;
    let stored = state.store.save_with_extension(&audio, "mp3").await?;
    metrics::record_upload("audio", audio.len());

    Ok(Json(VoiceCloneGenerateResponse {
        audio_url: origin.url_for(&stored.public_path),
    }))
}

/// `clone_` plus eight hex characters.
fn clone_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("clone_{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_name_shape() {
        let name = clone_name();
        let suffix = name.strip_prefix("clone_").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
