//! Replicate predictions: image stylization, video generation and lip-sync.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

use talkaz_models::{CharacterStyle, PredictionStatus, PromptSections};

use crate::config::GenAiConfig;
use crate::error::{GenAiError, GenAiResult};
use crate::http::{build_client, check_status, join_url, require};
use crate::prompts;

const SERVICE: &str = "replicate";

pub const IMAGE_MODEL: &str = "google/nano-banana-pro";
pub const VIDEO_MODEL: &str = "kwaivgi/kling-v2.5-turbo-pro";
pub const LIP_SYNC_MODEL: &str = "kwaivgi/kling-lip-sync";

/// A Replicate prediction as returned by the predictions API.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Prediction {
    /// First URL in the output, which may be a string or a list of strings.
    pub fn output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::String(url) => Some(url.clone()),
            Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
            Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Client for the Replicate HTTP API.
pub struct ReplicateClient {
    http: Client,
    config: GenAiConfig,
}

impl ReplicateClient {
    pub fn new(config: GenAiConfig) -> GenAiResult<Self> {
        let http = build_client(config.request_timeout)?;
        Ok(Self { http, config })
    }

    fn token(&self) -> GenAiResult<&str> {
        require(&self.config.replicate_api_token, "REPLICATE_API_TOKEN")
    }

    /// Start a prediction for an official model.
    ///
    /// With `wait`, Replicate holds the request open until the prediction
    /// finishes or its own sync window elapses.
    pub async fn create_prediction(
        &self,
        model: &str,
        input: Value,
        wait: bool,
    ) -> GenAiResult<Prediction> {
        let token = self.token()?;
        let url = join_url(
            &self.config.replicate_base_url,
            &format!("models/{}/predictions", model),
        );
        debug!(model, wait, "Creating prediction");

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "input": input }));
        if wait {
            request = request.header("Prefer", "wait");
        }

        let response = check_status(SERVICE, request.send().await?).await?;
        let prediction: Prediction = response.json().await?;
        info!(model, id = %prediction.id, status = %prediction.status, "Prediction created");
        Ok(prediction)
    }

    /// Fetch the current state of a prediction.
    pub async fn get_prediction(&self, id: &str) -> GenAiResult<Prediction> {
        let token = self.token()?;
        let url = join_url(&self.config.replicate_base_url, &format!("predictions/{}", id));
        let response = check_status(SERVICE, self.http.get(&url).bearer_auth(token).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Create a prediction and poll it to completion, returning its output URL.
    pub async fn run(&self, model: &str, input: Value) -> GenAiResult<String> {
        let start = Instant::now();
        let deadline = self.config.run_deadline;

        let mut prediction = self.create_prediction(model, input, true).await?;
        while !prediction.status.is_terminal() {
            if start.elapsed() >= deadline {
                warn!(model, id = %prediction.id, "Prediction exceeded run deadline");
                return Err(GenAiError::Timeout(format!(
                    "prediction {} still {} after {}s",
                    prediction.id,
                    prediction.status,
                    deadline.as_secs()
                )));
            }
            tokio::time::sleep(self.config.poll_interval).await;
            prediction = self.get_prediction(&prediction.id).await?;
        }

        match prediction.status {
            PredictionStatus::Succeeded => prediction.output_url().ok_or_else(|| {
                GenAiError::invalid_response(format!("prediction {} has no output URL", prediction.id))
            }),
            status => Err(GenAiError::PredictionFailed {
                id: prediction.id.clone(),
                status: status.to_string(),
                message: prediction
                    .error_message()
                    .unwrap_or_else(|| "no error message".to_string()),
            }),
        }
    }

    /// Restyle an uploaded photo into a green-screen character image.
    pub async fn stylize_image(
        &self,
        image: &[u8],
        mime: &str,
        style_prompt: &str,
    ) -> GenAiResult<String> {
        let data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(image));
        let input = json!({
            "prompt": prompts::stylization_prompt(style_prompt),
            "image_input": [data_uri],
            "aspect_ratio": "4:3",
            "output_format": "png",
        });
        self.run(IMAGE_MODEL, input).await
    }

    /// Start an image-to-video prediction; poll it with [`get_prediction`](Self::get_prediction).
    pub async fn create_video_prediction(
        &self,
        image_url: &str,
        spoken_line: &str,
        duration: f64,
        style: CharacterStyle,
        sections: Option<&PromptSections>,
    ) -> GenAiResult<Prediction> {
        let input = json!({
            "start_image": image_url,
            "prompt": prompts::video_prompt(spoken_line, style, sections),
            "negative_prompt": prompts::NEGATIVE_PROMPT,
            "duration": duration.trunc() as i64,
            "aspect_ratio": "9:16",
        });
        self.create_prediction(VIDEO_MODEL, input, false).await
    }

    /// Lip-sync a video to an audio track, returning the output URL.
    pub async fn lip_sync(&self, video_url: &str, audio_url: &str) -> GenAiResult<String> {
        let input = json!({
            "video_url": video_url,
            "audio_file": audio_url,
        });
        self.run(LIP_SYNC_MODEL, input).await
    }
}
