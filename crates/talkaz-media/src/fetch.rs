//! Remote media download.
//!
//! Bodies are streamed to disk chunk by chunk. Multiple downloads for one
//! stage run concurrently and fail fast: the first error cancels the rest.

use futures::future::try_join_all;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{MediaError, MediaResult};
use crate::metrics;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Extensions accepted verbatim from a source URL.
const KNOWN_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "webm", "mkv", "mp3", "wav", "m4a", "aac", "ogg", "flac", "jpg", "jpeg", "png",
    "webp",
];

/// One download: a remote URL and where to put it.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub url: String,
    pub dest: PathBuf,
}

impl FetchJob {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
        }
    }
}

/// HTTP downloader for remote media.
#[derive(Debug, Clone)]
pub struct MediaFetcher {
    client: reqwest::Client,
}

impl MediaFetcher {
    /// Create a fetcher with a whole-request `timeout`.
    pub fn new(timeout: Duration) -> MediaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| MediaError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Download `url` into `dest`, returning the number of bytes written.
    pub async fn fetch(&self, url: &str, dest: &Path) -> MediaResult<u64> {
        validate_url(url)?;
        let start = Instant::now();

        let result = self.download(url, dest).await;
        let secs = start.elapsed().as_secs_f64();
        metrics::record_download_duration(result.is_ok(), secs);

        match &result {
            Ok(bytes) => info!(url, bytes, duration_ms = (secs * 1000.0) as u64, "Downloaded media"),
            Err(e) => warn!(url, error = %e, "Download failed"),
        }
        result
    }

    async fn download(&self, url: &str, dest: &Path) -> MediaResult<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(MediaError::fetch_status(url, status.as_u16(), body));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport_error(url, e))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(url, dest = %dest.display(), written, "Wrote response body");
        Ok(written)
    }

    /// Download every job concurrently; fails on the first error.
    ///
    /// Remaining in-flight downloads are dropped when one fails. Callers own
    /// the destination paths and are responsible for removing them.
    pub async fn fetch_all(&self, jobs: &[FetchJob]) -> MediaResult<Vec<u64>> {
        try_join_all(jobs.iter().map(|job| self.fetch(&job.url, &job.dest))).await
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> MediaError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_redirect() {
        format!("too many redirects: {}", e)
    } else {
        e.to_string()
    };
    MediaError::fetch_failed(url, message)
}

/// Accept only absolute `http`/`https` URLs.
pub fn validate_url(url: &str) -> MediaResult<Url> {
    let parsed = Url::parse(url)
        .map_err(|e| MediaError::invalid_input(format!("invalid URL '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(MediaError::invalid_input(format!(
            "unsupported URL scheme '{}'",
            other
        ))),
    }
}

/// Pick a file extension from the URL path, falling back to `default`.
pub fn extension_from_url(url: &str, default: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|name| {
            Path::new(&name)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
        })
        .filter(|ext| KNOWN_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| default.to_string())
}
