//! Clients for the generative-AI collaborators.
//!
//! This crate provides:
//! - Replicate predictions (image stylization, video generation, lip-sync)
//! - ElevenLabs voice cloning and text-to-speech
//! - Hume voice design samples
//! - OpenAI prompt-section authoring
//! - The prompt templates shared by all of the above
//!
//! Every client checks its credential at first use and never retries.

pub mod config;
pub mod elevenlabs;
pub mod error;
mod http;
pub mod hume;
pub mod openai;
pub mod prompts;
pub mod replicate;

pub use config::GenAiConfig;
pub use elevenlabs::ElevenLabsClient;
pub use error::{GenAiError, GenAiResult};
pub use hume::{HumeClient, VoiceSampleAudio};
pub use openai::PromptClient;
pub use replicate::{Prediction, ReplicateClient};
