//! Application state.

use std::sync::Arc;

use talkaz_genai::{ElevenLabsClient, GenAiConfig, HumeClient, PromptClient, ReplicateClient};
use talkaz_media::{MediaConfig, Pipeline};
use talkaz_storage::{StorageConfig, UploadStore};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub media: Arc<MediaConfig>,
    pub pipeline: Pipeline,
    pub store: UploadStore,
    pub replicate: Arc<ReplicateClient>,
    pub elevenlabs: Arc<ElevenLabsClient>,
    pub hume: Arc<HumeClient>,
    pub prompts: Arc<PromptClient>,
}

impl AppState {
    /// Build state from explicit configuration.
    ///
    /// The store always serves the pipeline's upload directory, so finished
    /// runs are reachable under `/uploads/`.
    pub fn new(
        config: ApiConfig,
        media: MediaConfig,
        storage: StorageConfig,
        genai: GenAiConfig,
    ) -> anyhow::Result<Self> {
        let pipeline = Pipeline::from_config(&media)?;
        Self::with_pipeline(config, media, storage, genai, pipeline)
    }

    /// Build state around an already constructed pipeline.
    pub fn with_pipeline(
        config: ApiConfig,
        media: MediaConfig,
        storage: StorageConfig,
        genai: GenAiConfig,
        pipeline: Pipeline,
    ) -> anyhow::Result<Self> {
        let store = UploadStore::new(storage.with_upload_dir(media.upload_dir.clone()));

        Ok(Self {
            config,
            pipeline,
            store,
            replicate: Arc::new(ReplicateClient::new(genai.clone())?),
            elevenlabs: Arc::new(ElevenLabsClient::new(genai.clone())?),
            hume: Arc::new(HumeClient::new(genai.clone())?),
            prompts: Arc::new(PromptClient::new(genai)?),
            media: Arc::new(media),
        })
    }

    /// Build state from environment variables.
    pub fn from_env(config: ApiConfig) -> anyhow::Result<Self> {
        Self::new(
            config,
            MediaConfig::from_env(),
            StorageConfig::from_env(),
            GenAiConfig::from_env(),
        )
    }
}
