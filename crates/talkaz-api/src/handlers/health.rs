//! Health check handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use talkaz_media::check_toolchain;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub ffprobe: CheckStatus,
    pub upload_dir: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: Option<u64>) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks that the media toolchain resolves and the upload directory is writable.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let toolchain = check_toolchain(&state.media);
    let tool_check = |found: bool, name: &str| {
        if found {
            CheckStatus::ok(None)
        } else {
            CheckStatus::error(format!("{} not found", name))
        }
    };
    let ffmpeg = tool_check(toolchain.ffmpeg.is_some(), "ffmpeg");
    let ffprobe = tool_check(toolchain.ffprobe.is_some(), "ffprobe");

    let upload_dir = {
        let start = Instant::now();
        match probe_upload_dir(&state).await {
            Ok(()) => CheckStatus::ok(Some(start.elapsed().as_millis() as u64)),
            Err(e) => CheckStatus::error(e),
        }
    };

    let all_ok = ffmpeg.is_ok() && ffprobe.is_ok() && upload_dir.is_ok();
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks: ReadinessChecks {
            ffmpeg,
            ffprobe,
            upload_dir,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Write and remove a marker file in the upload directory.
async fn probe_upload_dir(state: &AppState) -> Result<(), String> {
    state.store.ensure_root().await.map_err(|e| e.to_string())?;
    let marker = state.store.root().join(format!(".ready-{}", Uuid::new_v4()));
    tokio::fs::write(&marker, b"ok")
        .await
        .map_err(|e| format!("upload dir not writable: {}", e))?;
    let _ = tokio::fs::remove_file(&marker).await;
    Ok(())
}
