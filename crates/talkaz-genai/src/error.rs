//! Provider client error types.

use thiserror::Error;

use talkaz_models::ErrorCode;

pub type GenAiResult<T> = Result<T, GenAiError>;

/// Longest upstream body kept on an error.
const MAX_BODY_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Prediction {id} {status}: {message}")]
    PredictionFailed {
        id: String,
        status: String,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenAiError {
    pub fn upstream(service: &'static str, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = if body.len() > MAX_BODY_LEN {
            let mut end = MAX_BODY_LEN;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &body[..end])
        } else {
            body
        };
        Self::Upstream {
            service,
            status,
            body,
        }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Client-facing code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            GenAiError::MissingCredential(_) => ErrorCode::ConfigurationError,
            GenAiError::Timeout(_) => ErrorCode::Timeout,
            GenAiError::Network(e) if e.is_timeout() => ErrorCode::Timeout,
            GenAiError::Upstream { .. }
            | GenAiError::PredictionFailed { .. }
            | GenAiError::InvalidResponse(_)
            | GenAiError::Network(_)
            | GenAiError::Json(_) => ErrorCode::UpstreamFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            GenAiError::MissingCredential("REPLICATE_API_TOKEN").code(),
            ErrorCode::ConfigurationError
        );
        assert_eq!(
            GenAiError::upstream("hume", 500, "oops").code(),
            ErrorCode::UpstreamFailed
        );
        assert_eq!(
            GenAiError::MissingCredential("HUME_API_KEY").to_string(),
            "HUME_API_KEY is not configured"
        );
    }

    #[test]
    fn test_upstream_body_truncated() {
        let err = GenAiError::upstream("replicate", 502, "x".repeat(5000));
        match err {
            GenAiError::Upstream { body, .. } => assert!(body.len() <= MAX_BODY_LEN + 3),
            _ => unreachable!(),
        }
    }
}
