//! Hume voice design: text plus a voice description in, audio samples out.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::GenAiConfig;
use crate::error::{GenAiError, GenAiResult};
use crate::http::{build_client, check_status, join_url, require};

const SERVICE: &str = "hume";

/// Duration reported when Hume omits one.
const DEFAULT_SAMPLE_SECS: f64 = 5.0;

/// One decoded voice sample.
#[derive(Debug, Clone)]
pub struct VoiceSampleAudio {
    pub id: String,
    pub audio: Vec<u8>,
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
struct TtsResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generation_id: Option<String>,
    audio: Option<String>,
    duration: Option<f64>,
}

pub struct HumeClient {
    http: Client,
    config: GenAiConfig,
}

impl HumeClient {
    pub fn new(config: GenAiConfig) -> GenAiResult<Self> {
        let http = build_client(config.request_timeout)?;
        Ok(Self { http, config })
    }

    /// Generate `count` takes of `text` in a voice matching `description`.
    ///
    /// Generations without audio are skipped.
    pub async fn generate_voice_samples(
        &self,
        text: &str,
        description: &str,
        count: u32,
    ) -> GenAiResult<Vec<VoiceSampleAudio>> {
        let key = require(&self.config.hume_api_key, "HUME_API_KEY")?;
        let url = join_url(&self.config.hume_base_url, "tts");

        let body = json!({
            "utterances": [{ "text": text, "description": description }],
            "num_generations": count,
            "version": "1",
        });
        let response = self
            .http
            .post(&url)
            .header("X-Hume-Api-Key", key)
            .json(&body)
            .send()
            .await?;
        let parsed: TtsResponse = check_status(SERVICE, response).await?.json().await?;

        let mut samples = Vec::with_capacity(parsed.generations.len());
        for generation in parsed.generations {
            let Some(encoded) = generation.audio.filter(|a| !a.is_empty()) else {
                warn!(generation_id = ?generation.generation_id, "Generation without audio");
                continue;
            };
            let audio = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                GenAiError::invalid_response(format!("undecodable audio payload: {}", e))
            })?;
            samples.push(VoiceSampleAudio {
                id: generation
                    .generation_id
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                audio,
                duration: generation.duration.unwrap_or(DEFAULT_SAMPLE_SECS),
            });
        }

        info!(requested = count, received = samples.len(), "Generated voice samples");
        Ok(samples)
    }
}
