//! Prompt-section authoring through the OpenAI Responses API.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use talkaz_models::{CharacterStyle, PromptSections};

use crate::config::GenAiConfig;
use crate::error::{GenAiError, GenAiResult};
use crate::http::{build_client, check_status, join_url, require};
use crate::prompts;

const SERVICE: &str = "openai";

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// Concatenated `output_text` parts of every message item.
    fn text(&self) -> Option<String> {
        if let Some(text) = self.output_text.as_ref().filter(|t| !t.trim().is_empty()) {
            return Some(text.clone());
        }
        let text: String = self
            .output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Authors animation and gesture sections for the video prompt.
pub struct PromptClient {
    http: Client,
    config: GenAiConfig,
}

impl PromptClient {
    pub fn new(config: GenAiConfig) -> GenAiResult<Self> {
        let http = build_client(config.request_timeout)?;
        Ok(Self { http, config })
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.config.openai_api_key.trim().is_empty()
    }

    pub async fn generate_prompt_sections(
        &self,
        spoken_line: &str,
        scene_description: &str,
        style: CharacterStyle,
    ) -> GenAiResult<PromptSections> {
        let key = require(&self.config.openai_api_key, "OPENAI_API_KEY")?;
        let url = join_url(&self.config.openai_base_url, "responses");
        let input = prompts::sections_prompt(spoken_line, scene_description, style);
        debug!(model = %self.config.openai_model, prompt_len = input.len(), "Requesting prompt sections");

        let body = json!({
            "model": self.config.openai_model,
            "input": input,
            "reasoning": { "effort": "none" },
            "text": { "verbosity": "medium" },
        });
        let response = self.http.post(&url).bearer_auth(key).json(&body).send().await?;
        let parsed: ResponsesResponse = check_status(SERVICE, response).await?.json().await?;

        let text = parsed
            .text()
            .ok_or_else(|| GenAiError::invalid_response("empty response from language model"))?;
        let sections = parse_sections(&text)?;
        info!(style = %style, "Generated prompt sections");
        Ok(sections)
    }
}

/// Parse the model's JSON answer, tolerating a surrounding markdown fence.
pub fn parse_sections(text: &str) -> GenAiResult<PromptSections> {
    let text = strip_code_fence(text);
    serde_json::from_str(text)
        .map_err(|e| GenAiError::invalid_response(format!("invalid prompt sections JSON: {}", e)))
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECTIONS: &str = r#"{"animation_instructions": "- Static camera.", "hand_arm_gestures": "- Thumbs up."}"#;

    #[test]
    fn test_parse_plain_and_fenced() {
        let plain = parse_sections(SECTIONS).unwrap();
        assert_eq!(plain.hand_arm_gestures, "- Thumbs up.");

        let fenced = format!("```json\n{}\n```", SECTIONS);
        assert_eq!(parse_sections(&fenced).unwrap(), plain);

        let bare_fence = format!("```\n{}\n```\n", SECTIONS);
        assert_eq!(parse_sections(&bare_fence).unwrap(), plain);
    }

    #[test]
    fn test_parse_rejects_missing_keys() {
        let err = parse_sections(r#"{"animation_instructions": "x"}"#).unwrap_err();
        assert!(matches!(err, GenAiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_reads_message_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-5.2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": [
                    {"type": "reasoning", "content": []},
                    {"type": "message", "content": [
                        {"type": "output_text", "text": format!("```json\n{}\n```", SECTIONS)}
                    ]}
                ]
            })))
            .mount(&server)
            .await;

        let client = PromptClient::new(GenAiConfig {
            openai_api_key: "sk-test".to_string(),
            openai_base_url: server.uri(),
            ..GenAiConfig::default()
        })
        .unwrap();

        let sections = client
            .generate_prompt_sections("Happy birthday!", "a party", CharacterStyle::Ps2)
            .await
            .unwrap();
        assert_eq!(sections.animation_instructions, "- Static camera.");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = PromptClient::new(GenAiConfig::default()).unwrap();
        assert!(!client.is_configured());
        let err = client
            .generate_prompt_sections("a", "b", CharacterStyle::Anime)
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::MissingCredential("OPENAI_API_KEY")));
    }
}
