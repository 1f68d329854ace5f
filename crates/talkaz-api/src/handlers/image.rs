//! Image upload and stylization handlers.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use talkaz_models::{ImageGenerateRequest, ImageGenerateResponse, ImageUploadResponse};

use crate::error::ApiResult;
use crate::extract::{read_upload, PublicOrigin, ValidatedJson};
use crate::metrics;
use crate::state::AppState;

/// Store an uploaded photo. The part must be `image/*`.
pub async fn upload_image(
    State(state): State<AppState>,
    origin: PublicOrigin,
    multipart: Multipart,
) -> ApiResult<Json<ImageUploadResponse>> {
    let upload = read_upload(multipart, "image/").await?;
    let stored = state
        .store
        .save(&upload.bytes, upload.file_name.as_deref())
        .await?;
    metrics::record_upload("image", upload.bytes.len());

    info!(id = %stored.id, bytes = upload.bytes.len(), content_type = %upload.content_type, "Stored image upload");

    Ok(Json(ImageUploadResponse {
        id: stored.id,
        url: origin.url_for(&stored.public_path),
    }))
}

/// Restyle a previously uploaded photo into a green-screen character.
pub async fn generate_image(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ImageGenerateRequest>,
) -> ApiResult<Json<ImageGenerateResponse>> {
    let image = state.store.read(&request.source_image_url).await?;
    let mime = image_mime(&request.source_image_url);

    let output_url = state
        .replicate
        .stylize_image(&image, mime, &request.style_prompt)
        .await?;

    info!(source = %request.source_image_url, "Stylized image");
    Ok(Json(ImageGenerateResponse { output_url }))
}

/// MIME type for a stored image, by the extension of its URL.
fn image_mime(url: &str) -> &'static str {
    let name = url.split(['?', '#']).next().unwrap_or_default();
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "image/png",
    }
}
