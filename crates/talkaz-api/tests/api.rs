//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use talkaz_api::{create_router, ApiConfig, AppState};
use talkaz_genai::GenAiConfig;
use talkaz_media::{
    MediaConfig, MediaError, MediaFetcher, MediaResult, MediaTools, OverlayGeometry, Pipeline,
};
use talkaz_storage::StorageConfig;

const HOST: &str = "talkaz.test";

struct TestApp {
    router: Router,
    dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with(ApiConfig::default(), GenAiConfig::default())
    }

    fn with(config: ApiConfig, genai: GenAiConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let media = MediaConfig::default().with_upload_dir(dir.path());
        let state = AppState::new(config, media, StorageConfig::default(), genai).unwrap();
        Self {
            router: create_router(state, None),
            dir,
        }
    }

    /// App whose pipeline runs against `tools` instead of FFmpeg.
    fn with_tools(config: ApiConfig, tools: FakeTools) -> Self {
        let dir = TempDir::new().unwrap();
        let media = MediaConfig::default().with_upload_dir(dir.path());
        let pipeline = Pipeline::new(
            Arc::new(tools),
            MediaFetcher::new(Duration::from_secs(10)).unwrap(),
            dir.path(),
        );
        let state = AppState::with_pipeline(
            config,
            media,
            StorageConfig::default(),
            GenAiConfig::default(),
            pipeline,
        )
        .unwrap();
        Self {
            router: create_router(state, None),
            dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    fn files(&self) -> Vec<String> {
        std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

/// Stand-in toolchain: fixed probe results, transforms write their output.
#[derive(Default)]
struct FakeTools {
    fail_transforms: bool,
}

impl FakeTools {
    async fn write(&self, step: &str, output: &Path) -> MediaResult<()> {
        if self.fail_transforms {
            return Err(MediaError::transcode_failed(
                format!("{} failed", step),
                Some("Conversion failed!".to_string()),
                Some(1),
            ));
        }
        tokio::fs::write(output, step.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl MediaTools for FakeTools {
    async fn probe_duration(&self, _path: &Path) -> MediaResult<f64> {
        Ok(7.0)
    }

    async fn probe_video_size(&self, _path: &Path) -> MediaResult<(u32, u32)> {
        Ok((1080, 1920))
    }

    async fn trim(&self, _input: &Path, _duration: f64, output: &Path) -> MediaResult<()> {
        self.write("trim", output).await
    }

    async fn mux(&self, _video: &Path, _audio: &Path, output: &Path) -> MediaResult<()> {
        self.write("mux", output).await
    }

    async fn composite(
        &self,
        _foreground: &Path,
        _background: &Path,
        output: &Path,
        _geometry: &OverlayGeometry,
    ) -> MediaResult<()> {
        self.write("chromakey", output).await
    }
}

/// Serve a few bytes for each of `paths`.
async fn media_server(paths: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    for p in paths {
        Mock::given(method("GET"))
            .and(path(*p))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 128]))
            .mount(&server)
            .await;
    }
    server
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", HOST)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", HOST)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_file(uri: &str, content_type: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "talkaz-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("host", HOST)
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send_json(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_every_check() {
    let app = TestApp::new();
    let (status, body) = app.send_json(get("/ready")).await;
    // The toolchain may be absent on the test host; the shape is what matters.
    assert!(status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["upload_dir"]["status"], "ok");
    assert!(body["checks"]["ffmpeg"]["status"].is_string());
    assert!(app.files().is_empty(), "readiness marker must be removed");
}

#[tokio::test]
async fn test_catalogs() {
    let app = TestApp::new();
    let (status, styles) = app.send_json(get("/api/v1/styles")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = styles
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["ps2", "anime"]);

    let (status, rooms) = app.send_json(get("/api/v1/rooms")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_merge_rejects_non_url() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(post_json(
            "/api/v1/video/merge",
            json!({"video_url": "not a url", "audio_url": "https://cdn.example.com/a.mp3"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_apply_background_rejects_scale_out_of_range() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(post_json(
            "/api/v1/video/apply-background",
            json!({
                "video_url": "https://cdn.example.com/v.mp4",
                "background_url": "https://cdn.example.com/bg.jpg",
                "scale": 1.5
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert!(app.files().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_invalid_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/video/merge")
        .header("host", HOST)
        .header("content-type", "application/json")
        .body(Body::from("{\"video_url\":"))
        .unwrap();
    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_merge_fetch_failure_is_remote_fetch_failed_and_cleans_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v.mp4"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .mount(&server)
        .await;

    let app = TestApp::new();
    let (status, body) = app
        .send_json(post_json(
            "/api/v1/video/merge",
            json!({
                "video_url": format!("{}/v.mp4", server.uri()),
                "audio_url": format!("{}/a.mp3", server.uri()),
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "remote_fetch_failed");
    assert!(body["detail"].as_str().unwrap().contains("404"));
    assert!(app.files().is_empty(), "left behind: {:?}", app.files());
}

#[tokio::test]
async fn test_merge_returns_deliverable_url() {
    let server = media_server(&["/v.mp4", "/a.mp3"]).await;
    let app = TestApp::with_tools(ApiConfig::default(), FakeTools::default());

    let (status, body) = app
        .send_json(post_json(
            "/api/v1/video/merge",
            json!({
                "video_url": format!("{}/v.mp4", server.uri()),
                "audio_url": format!("{}/a.mp3", server.uri()),
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let files = app.files();
    assert_eq!(files.len(), 1, "intermediates left behind: {files:?}");
    assert!(files[0].ends_with("_merged.mp4"));
    assert_eq!(
        body["output_url"],
        format!("http://{}/uploads/{}", HOST, files[0])
    );

    let (status, served) = app.send(get(&format!("/uploads/{}", files[0]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, b"mux");
}

#[tokio::test]
async fn test_apply_background_returns_deliverable_url() {
    let server = media_server(&["/fg.mp4", "/room.jpg"]).await;
    let config = ApiConfig {
        public_base_url: Some("https://cdn.talkaz.test".to_string()),
        ..ApiConfig::default()
    };
    let app = TestApp::with_tools(config, FakeTools::default());

    let (status, body) = app
        .send_json(post_json(
            "/api/v1/video/apply-background",
            json!({
                "video_url": format!("{}/fg.mp4", server.uri()),
                "background_url": format!("{}/room.jpg", server.uri()),
                "scale": 0.6,
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let files = app.files();
    assert_eq!(files.len(), 1, "intermediates left behind: {files:?}");
    assert!(files[0].ends_with("_final.mp4"));
    assert_eq!(
        body["output_url"],
        format!("https://cdn.talkaz.test/uploads/{}", files[0])
    );
}

#[tokio::test]
async fn test_transcode_failure_detail_is_hidden_in_production() {
    let server = media_server(&["/v.mp4", "/a.mp3"]).await;
    let request = || {
        post_json(
            "/api/v1/video/merge",
            json!({
                "video_url": format!("{}/v.mp4", server.uri()),
                "audio_url": format!("{}/a.mp3", server.uri()),
            }),
        )
    };

    let app = TestApp::with_tools(
        ApiConfig::default(),
        FakeTools {
            fail_transforms: true,
        },
    );
    let (status, body) = app.send_json(request()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "transcode_failed");
    assert!(body["detail"].as_str().unwrap().contains("trim failed"));
    assert!(app.files().is_empty(), "left behind: {:?}", app.files());

    let production = ApiConfig {
        environment: "production".to_string(),
        ..ApiConfig::default()
    };
    let app = TestApp::with_tools(
        production,
        FakeTools {
            fail_transforms: true,
        },
    );
    let (status, body) = app.send_json(request()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "transcode_failed");
    assert_eq!(body["detail"], "An internal error occurred");
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(post_file("/api/v1/image/upload", "text/plain", "notes.txt", b"hello"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert!(app.files().is_empty());
}

#[tokio::test]
async fn test_upload_image_is_served() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(post_file("/api/v1/image/upload", "image/png", "me.png", b"\x89PNG-bytes"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let url = body["url"].as_str().unwrap();
    let id = body["id"].as_str().unwrap();
    assert_eq!(url, format!("http://{HOST}/uploads/{id}.png"));

    let served_path = url.trim_start_matches(&format!("http://{HOST}"));
    let (status, bytes) = app.send(get(served_path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"\x89PNG-bytes");
}

#[tokio::test]
async fn test_generate_image_without_token_is_configuration_error() {
    let app = TestApp::new();
    let (_, uploaded) = app
        .send_json(post_file("/api/v1/image/upload", "image/jpeg", "me.jpg", b"jpeg"))
        .await;

    let (status, body) = app
        .send_json(post_json(
            "/api/v1/image/generate",
            json!({"source_image_url": uploaded["url"], "style_prompt": "ps2"}),
        ))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "configuration_error");
    assert!(body["detail"].as_str().unwrap().contains("REPLICATE_API_TOKEN"));
}

#[tokio::test]
async fn test_generate_image_unknown_source_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(post_json(
            "/api/v1/image/generate",
            json!({"source_image_url": "http://talkaz.test/uploads/missing.png", "style_prompt": "anime"}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_video_status_reads_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/predictions/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc123",
            "status": "succeeded",
            "output": ["https://replicate.delivery/out.mp4"]
        })))
        .mount(&server)
        .await;

    let app = TestApp::with(
        ApiConfig::default(),
        GenAiConfig {
            replicate_api_token: "r8_test".to_string(),
            replicate_base_url: server.uri(),
            ..GenAiConfig::default()
        },
    );
    let (status, body) = app.send_json(get("/api/v1/video/status/abc123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "succeeded");
    assert_eq!(body["output_url"], "https://replicate.delivery/out.mp4");
    assert!(body.get("error").is_none());

    let (status, _) = app.send_json(get("/api/v1/video/status/bad.id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cloned_voice_speech_is_stored_under_public_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text-to-speech/voice-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3-mp3".to_vec()))
        .mount(&server)
        .await;

    let app = TestApp::with(
        ApiConfig {
            public_base_url: Some("https://api.talkaz.test".to_string()),
            ..ApiConfig::default()
        },
        GenAiConfig {
            elevenlabs_api_key: "xi_test".to_string(),
            elevenlabs_base_url: server.uri(),
            ..GenAiConfig::default()
        },
    );

    let (status, body) = app
        .send_json(post_json(
            "/api/v1/voice/clone/generate",
            json!({"voice_id": "voice-1", "text": "What's up?"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let audio_url = body["audio_url"].as_str().unwrap();
    let filename = audio_url
        .strip_prefix("https://api.talkaz.test/uploads/")
        .unwrap();
    assert!(filename.ends_with(".mp3"));
    assert_eq!(std::fs::read(app.dir.path().join(filename)).unwrap(), b"ID3-mp3");
}

#[tokio::test]
async fn test_clone_voice_requires_audio() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/voices/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"voice_id": "v9"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::with(
        ApiConfig::default(),
        GenAiConfig {
            elevenlabs_api_key: "xi_test".to_string(),
            elevenlabs_base_url: server.uri(),
            ..GenAiConfig::default()
        },
    );

    let (status, _) = app
        .send_json(post_file("/api/v1/voice/clone", "image/png", "a.png", b"png"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send_json(post_file("/api/v1/voice/clone", "audio/mpeg", "me.mp3", b"ID3"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["voice_id"], "v9");
}

#[tokio::test]
async fn test_prompt_sections_without_key_is_configuration_error() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json(post_json(
            "/api/v1/prompt/sections",
            json!({"spoken_line": "Happy birthday!", "scene_description": "a party"}),
        ))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "configuration_error");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();
    let (status, _) = app.send(get("/api/v1/character/generate")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
