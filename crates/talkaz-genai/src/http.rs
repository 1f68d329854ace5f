//! Shared request plumbing.

use reqwest::{Client, Response};
use std::time::Duration;

use crate::error::{GenAiError, GenAiResult};

pub(crate) fn build_client(timeout: Duration) -> GenAiResult<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Fail with the configured variable name when a credential is empty.
pub(crate) fn require<'a>(value: &'a str, var: &'static str) -> GenAiResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(GenAiError::MissingCredential(var))
    } else {
        Ok(value)
    }
}

/// Pass a success response through, turn anything else into `Upstream`.
pub(crate) async fn check_status(service: &'static str, response: Response) -> GenAiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GenAiError::upstream(service, status.as_u16(), body))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
