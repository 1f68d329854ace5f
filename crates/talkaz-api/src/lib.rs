//! Axum HTTP API server.
//!
//! This crate provides:
//! - The `/api/v1` routes for image, video, voice and prompt workflows
//! - Static serving of the upload directory under `/uploads`
//! - Rate limiting, request ids and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
