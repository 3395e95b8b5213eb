use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunker::DEFAULT_MAX_WORDS;
use crate::request::GenerationRequestBuilder;
use crate::voices::DEFAULT_ENGLISH_VOICE;

/// Default number of characters synthesized by a preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Pipeline defaults, loadable from a JSON file. Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_words: usize,
    pub voice: String,
    pub speed: f32,
    pub preview_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            voice: DEFAULT_ENGLISH_VOICE.to_string(),
            speed: 1.0,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        log::debug!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// A request builder pre-filled with this config's voice, speed and chunk size.
    pub fn request_builder(&self) -> GenerationRequestBuilder {
        let mut builder = GenerationRequestBuilder::default();
        builder
            .voice(self.voice.clone())
            .speed(self.speed)
            .max_words(self.max_words);
        builder
    }
}
