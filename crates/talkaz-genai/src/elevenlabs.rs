//! ElevenLabs instant voice cloning and text-to-speech.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::GenAiConfig;
use crate::error::GenAiResult;
use crate::http::{build_client, check_status, join_url, require};

const SERVICE: &str = "elevenlabs";

pub const TTS_MODEL: &str = "eleven_multilingual_v2";
pub const OUTPUT_FORMAT: &str = "mp3_44100_128";

#[derive(Debug, Deserialize)]
struct AddVoiceResponse {
    voice_id: String,
}

pub struct ElevenLabsClient {
    http: Client,
    config: GenAiConfig,
}

impl ElevenLabsClient {
    pub fn new(config: GenAiConfig) -> GenAiResult<Self> {
        let http = build_client(config.request_timeout)?;
        Ok(Self { http, config })
    }

    fn api_key(&self) -> GenAiResult<&str> {
        require(&self.config.elevenlabs_api_key, "ELEVENLABS_API_KEY")
    }

    /// Create an instant voice clone from one audio sample; returns the voice id.
    pub async fn clone_voice(&self, audio: Vec<u8>, name: &str) -> GenAiResult<String> {
        let key = self.api_key()?;
        let url = join_url(&self.config.elevenlabs_base_url, "voices/add");

        let sample = Part::bytes(audio).file_name("sample.mp3");
        let form = Form::new().text("name", name.to_string()).part("files", sample);

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", key)
            .multipart(form)
            .send()
            .await?;
        let voice: AddVoiceResponse = check_status(SERVICE, response).await?.json().await?;

        info!(name, voice_id = %voice.voice_id, "Cloned voice");
        Ok(voice.voice_id)
    }

    /// Synthesize `text` with `voice_id`; returns MP3 bytes.
    pub async fn text_to_speech(&self, voice_id: &str, text: &str) -> GenAiResult<Vec<u8>> {
        let key = self.api_key()?;
        let url = join_url(
            &self.config.elevenlabs_base_url,
            &format!("text-to-speech/{}", voice_id),
        );

        let response = self
            .http
            .post(&url)
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", key)
            .header("Accept", "audio/mpeg")
            .json(&json!({ "text": text, "model_id": TTS_MODEL }))
            .send()
            .await?;
        let audio = check_status(SERVICE, response).await?.bytes().await?;

        info!(voice_id, bytes = audio.len(), "Synthesized speech");
        Ok(audio.to_vec())
    }
}
