//! Request extractors.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// JSON body that is deserialized and then validated.
///
/// Both failures surface as `invalid_request`.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Origin used to turn `/uploads/...` paths into absolute URLs.
#[derive(Debug, Clone)]
pub struct PublicOrigin(pub String);

impl PublicOrigin {
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for PublicOrigin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(base) = &state.config.public_base_url {
            return Ok(Self(base.clone()));
        }
        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .filter(|h| !h.is_empty() && !h.contains(['/', '@', ' ']))
            .ok_or_else(|| ApiError::bad_request("Missing Host header"))?;
        Ok(Self(format!("http://{}", host)))
    }
}

/// The `file` part of a multipart upload.
#[derive(Debug)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Read the `file` field, requiring a content type under `type_prefix`
/// (e.g. `image/`). Other fields are ignored.
pub async fn read_upload(mut multipart: Multipart, type_prefix: &str) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_lowercase();
        if !content_type.starts_with(type_prefix) {
            let kind = type_prefix.trim_end_matches('/');
            return Err(ApiError::bad_request(format!("File must be an {} file", kind)));
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }
        return Ok(UploadedFile {
            bytes,
            content_type,
            file_name,
        });
    }
    Err(ApiError::bad_request("Missing multipart field 'file'"))
}
