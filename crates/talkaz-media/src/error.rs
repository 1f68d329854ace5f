//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use talkaz_models::{ErrorCode, StageTransitionError};

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Longest response body kept on a fetch error.
const MAX_ERROR_BODY_LEN: usize = 512;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found")]
    ToolNotFound(String),

    #[error("Remote fetch failed for {url}: {message}")]
    RemoteFetch {
        url: String,
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    #[error("FFprobe failed: {message}")]
    Probe {
        message: String,
        stderr: Option<String>,
    },

    #[error("FFmpeg {message}")]
    Transcode {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{tool} timed out after {secs} seconds")]
    Timeout { tool: String, secs: u64 },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a fetch error from a transport failure.
    pub fn fetch_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteFetch {
            url: url.into(),
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Create a fetch error from a non-success HTTP status.
    pub fn fetch_status(url: impl Into<String>, status: u16, body: Option<String>) -> Self {
        let body = body
            .map(|b| truncate(b.trim(), MAX_ERROR_BODY_LEN))
            .filter(|b| !b.is_empty());
        let message = match &body {
            Some(body) => format!("HTTP {}: {}", status, body),
            None => format!("HTTP {}", status),
        };
        Self::RemoteFetch {
            url: url.into(),
            message,
            status: Some(status),
            body,
        }
    }

    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Probe {
            message: message.into(),
            stderr,
        }
    }

    /// Create a transcode failure error.
    pub fn transcode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::Transcode {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Client-facing code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MediaError::RemoteFetch { .. } => ErrorCode::RemoteFetchFailed,
            MediaError::Probe { .. } => ErrorCode::ProbeFailed,
            MediaError::Transcode { .. } => ErrorCode::TranscodeFailed,
            MediaError::ToolNotFound(_) | MediaError::Configuration(_) => {
                ErrorCode::ConfigurationError
            }
            MediaError::InvalidInput(_) => ErrorCode::InvalidRequest,
            MediaError::Timeout { .. } => ErrorCode::Timeout,
            MediaError::FileNotFound(_) | MediaError::Io(_) | MediaError::Internal(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// Captured stderr of the failing subprocess, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            MediaError::Probe { stderr, .. } | MediaError::Transcode { stderr, .. } => {
                stderr.as_deref()
            }
            _ => None,
        }
    }
}

impl From<StageTransitionError> for MediaError {
    fn from(e: StageTransitionError) -> Self {
        Self::Internal(e.to_string())
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_status_message() {
        let err = MediaError::fetch_status(
            "https://cdn.example.com/a.mp4",
            404,
            Some("Not Found\n".to_string()),
        );
        assert_eq!(err.code(), ErrorCode::RemoteFetchFailed);
        assert_eq!(
            err.to_string(),
            "Remote fetch failed for https://cdn.example.com/a.mp4: HTTP 404: Not Found"
        );
    }

    #[test]
    fn test_fetch_status_without_body() {
        let err = MediaError::fetch_status("https://x.test/a", 500, Some("   ".to_string()));
        match err {
            MediaError::RemoteFetch { body, status, .. } => {
                assert_eq!(status, Some(500));
                assert!(body.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_long_body_is_truncated() {
        let err = MediaError::fetch_status("https://x.test/a", 502, Some("é".repeat(600)));
        if let MediaError::RemoteFetch { body: Some(body), .. } = err {
            assert!(body.ends_with("..."));
            assert!(body.len() <= MAX_ERROR_BODY_LEN + 3);
        } else {
            panic!("expected body");
        }
    }

    #[test]
    fn test_stderr_accessor() {
        let err = MediaError::transcode_failed("trim failed", Some("moov atom not found".into()), Some(1));
        assert_eq!(err.stderr(), Some("moov atom not found"));
        assert_eq!(err.code(), ErrorCode::TranscodeFailed);
        assert_eq!(MediaError::invalid_input("x").code(), ErrorCode::InvalidRequest);
    }
}
