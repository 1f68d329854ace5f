//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::handlers::{
    apply_background, clone_voice, generate_cloned_voice, generate_image, generate_sections,
    generate_video, generate_voice, get_video_status, health, lip_sync, list_rooms, list_styles,
    merge_video, ready, upload_image,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, redact_internal_errors, request_id, request_logging,
    security_headers, RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let catalog_routes = Router::new()
        .route("/styles", get(list_styles))
        .route("/rooms", get(list_rooms));

    let image_routes = Router::new()
        .route("/image/upload", post(upload_image))
        .route("/image/generate", post(generate_image));

    let video_routes = Router::new()
        .route("/video/generate", post(generate_video))
        .route("/video/status/:prediction_id", get(get_video_status))
        .route("/video/lipsync", post(lip_sync))
        .route("/video/merge", post(merge_video))
        .route("/video/apply-background", post(apply_background));

    let voice_routes = Router::new()
        .route("/voice/generate", post(generate_voice))
        .route("/voice/clone", post(clone_voice))
        .route("/voice/clone/generate", post(generate_cloned_voice));

    let prompt_routes = Router::new().route("/prompt/sections", post(generate_sections));

    let rate_limiter = Arc::new(RateLimiterCache::new(
        state.config.rate_limit_rps,
        state.config.rate_limit_burst,
    ));

    let api_routes = Router::new()
        .merge(catalog_routes)
        .merge(image_routes)
        .merge(video_routes)
        .merge(voice_routes)
        .merge(prompt_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    let uploads = ServeDir::new(state.store.root());

    Router::new()
        .nest("/api/v1", api_routes)
        .nest_service("/uploads", uploads)
        .merge(health_routes)
        .merge(metrics_routes)
        // Multipart reads are bounded by DefaultBodyLimit, everything else by the layer.
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.config.is_production(),
            redact_internal_errors,
        ))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
