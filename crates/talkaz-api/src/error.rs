//! API error types.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use talkaz_genai::GenAiError;
use talkaz_media::MediaError;
use talkaz_models::ErrorCode;
use talkaz_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    GenAi(#[from] GenAiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::BadRequest(_) | ApiError::Validation(_) => ErrorCode::InvalidRequest,
            ApiError::RateLimited => ErrorCode::RateLimited,
            ApiError::Internal(_) => ErrorCode::InternalError,
            ApiError::Media(e) => e.code(),
            ApiError::GenAi(e) => e.code(),
            ApiError::Storage(StorageError::NotFound(_)) => ErrorCode::NotFound,
            ApiError::Storage(StorageError::InvalidKey(_)) => ErrorCode::InvalidRequest,
            ApiError::Storage(_) => ErrorCode::StorageFailed,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::ProbeFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::RemoteFetchFailed | ErrorCode::UpstreamFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::ConfigurationError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::TranscodeFailed | ErrorCode::StorageFailed | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: ErrorCode,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        if status.is_server_error() {
            error!(code = %code, stderr = ?self.media_stderr(), "Request failed: {}", self);
        } else {
            warn!(code = %code, "Request rejected: {}", self);
        }

        let mut response = (
            status,
            Json(ErrorResponse {
                detail: self.to_string(),
                code,
            }),
        )
            .into_response();
        // Lets `redact_internal_errors` recognise rendered API errors.
        response.extensions_mut().insert(code);
        response
    }
}

/// Generic body for an internal error whose detail must not leak.
pub fn redacted_response(code: ErrorCode) -> Response {
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            detail: "An internal error occurred".to_string(),
            code,
        }),
    )
        .into_response();
    response.extensions_mut().insert(code);
    response
}

impl ApiError {
    fn media_stderr(&self) -> Option<&str> {
        match self {
            ApiError::Media(e) => e.stderr(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_tagged_with_its_code() {
        let response = ApiError::internal("disk on fire").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<ErrorCode>(),
            Some(&ErrorCode::InternalError)
        );

        let redacted = redacted_response(ErrorCode::TranscodeFailed);
        assert_eq!(redacted.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            redacted.extensions().get::<ErrorCode>(),
            Some(&ErrorCode::TranscodeFailed)
        );
    }

    #[test]
    fn test_media_errors_keep_their_code() {
        let err = ApiError::from(MediaError::fetch_status("https://x.test/a.mp4", 404, None));
        assert_eq!(err.code(), ErrorCode::RemoteFetchFailed);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err = ApiError::from(MediaError::transcode_failed("mux failed", None, Some(1)));
        assert_eq!(err.code(), ErrorCode::TranscodeFailed);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(MediaError::invalid_input("scale must be in (0, 1]"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_credential_is_configuration_error() {
        let err = ApiError::from(GenAiError::MissingCredential("REPLICATE_API_TOKEN"));
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_storage_codes() {
        assert_eq!(
            ApiError::from(StorageError::not_found("a.png")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StorageError::invalid_key("../a")).code(),
            ErrorCode::InvalidRequest
        );
    }
}
