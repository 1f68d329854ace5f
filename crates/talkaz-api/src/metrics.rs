//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the Prometheus recorder and return its render handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "talkaz_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "talkaz_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "talkaz_http_requests_in_flight";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "talkaz_rate_limit_hits_total";

    // Upload metrics
    pub const UPLOADS_TOTAL: &str = "talkaz_uploads_total";
    pub const UPLOAD_BYTES: &str = "talkaz_upload_bytes";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Record a file written to the upload directory (`kind` is image, audio, ...).
pub fn record_upload(kind: &'static str, bytes: usize) {
    let labels = [("kind", kind)];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
    histogram!(names::UPLOAD_BYTES, &labels).record(bytes as f64);
}

/// Collapse ids and filenames so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    if path.starts_with("/uploads/") {
        return "/uploads/:filename".to_string();
    }
    match path.strip_prefix("/api/v1/video/status/") {
        Some(id) if !id.is_empty() => "/api/v1/video/status/:id".to_string(),
        _ => path.to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    record_http_request(&method, &path, status, start.elapsed().as_secs_f64());

    response
}
