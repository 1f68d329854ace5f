//! Machine-readable error codes returned to API clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error code carried in every error response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Downloading a remote media reference failed.
    RemoteFetchFailed,
    /// The media inspector rejected or misreported a file.
    ProbeFailed,
    /// The transcoder exited with an error.
    TranscodeFailed,
    /// A required credential or setting is missing.
    ConfigurationError,
    /// The request body or parameters are invalid.
    InvalidRequest,
    /// A stage exceeded its time budget.
    Timeout,
    /// A generative-AI collaborator returned an error.
    UpstreamFailed,
    /// Writing to or reading from the upload directory failed.
    StorageFailed,
    NotFound,
    RateLimited,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RemoteFetchFailed => "remote_fetch_failed",
            ErrorCode::ProbeFailed => "probe_failed",
            ErrorCode::TranscodeFailed => "transcode_failed",
            ErrorCode::ConfigurationError => "configuration_error",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::Timeout => "timeout",
            ErrorCode::UpstreamFailed => "upstream_failed",
            ErrorCode::StorageFailed => "storage_failed",
            ErrorCode::NotFound => "not_found",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
