//! Provider credentials and endpoints.

use std::time::Duration;

pub const DEFAULT_REPLICATE_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_ELEVENLABS_URL: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_HUME_URL: &str = "https://api.hume.ai/v0";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5.2";

/// Configuration shared by all provider clients.
///
/// Credentials may be empty; a client only fails (with
/// `GenAiError::MissingCredential`) when it is actually used.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    pub replicate_api_token: String,
    pub elevenlabs_api_key: String,
    pub hume_api_key: String,
    pub openai_api_key: String,

    pub replicate_base_url: String,
    pub elevenlabs_base_url: String,
    pub hume_base_url: String,
    pub openai_base_url: String,
    pub openai_model: String,

    /// Per-request timeout
    pub request_timeout: Duration,
    /// Delay between prediction status polls
    pub poll_interval: Duration,
    /// Upper bound on a blocking `run` (create + poll)
    pub run_deadline: Duration,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            replicate_api_token: String::new(),
            elevenlabs_api_key: String::new(),
            hume_api_key: String::new(),
            openai_api_key: String::new(),
            replicate_base_url: DEFAULT_REPLICATE_URL.to_string(),
            elevenlabs_base_url: DEFAULT_ELEVENLABS_URL.to_string(),
            hume_base_url: DEFAULT_HUME_URL.to_string(),
            openai_base_url: DEFAULT_OPENAI_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            request_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
            run_deadline: Duration::from_secs(600),
        }
    }
}

impl GenAiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, default: String| std::env::var(key).unwrap_or(default);

        Self {
            replicate_api_token: var("REPLICATE_API_TOKEN", defaults.replicate_api_token),
            elevenlabs_api_key: var("ELEVENLABS_API_KEY", defaults.elevenlabs_api_key),
            hume_api_key: var("HUME_API_KEY", defaults.hume_api_key),
            openai_api_key: var("OPENAI_API_KEY", defaults.openai_api_key),
            replicate_base_url: var("REPLICATE_BASE_URL", defaults.replicate_base_url),
            elevenlabs_base_url: var("ELEVENLABS_BASE_URL", defaults.elevenlabs_base_url),
            hume_base_url: var("HUME_BASE_URL", defaults.hume_base_url),
            openai_base_url: var("OPENAI_BASE_URL", defaults.openai_base_url),
            openai_model: var("OPENAI_MODEL", defaults.openai_model),
            request_timeout: std::env::var("GENAI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            poll_interval: std::env::var("REPLICATE_POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            run_deadline: std::env::var("REPLICATE_RUN_DEADLINE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.run_deadline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GenAiConfig::default();
        assert!(config.replicate_api_token.is_empty());
        assert_eq!(config.hume_base_url, "https://api.hume.ai/v0");
        assert_eq!(config.openai_model, "gpt-5.2");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
    }
}
