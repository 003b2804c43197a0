//! Application configuration
//!
//! Read from `<config_dir>/vocalis/config.toml`. Every field has a default,
//! so a missing or partial file is fine. `GEMINI_API_KEY` and
//! `VOCALIS_MODEL` override the model section.

use crate::llm::config::ModelConfig;
use crate::session::store::default_data_dir;
use crate::speech::config::{SpeechInputConfig, SpeechOutputConfig};
use crate::{Result, VocalisError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "VOCALIS_MODEL";

/// Where chat records are kept
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub speech_input: SpeechInputConfig,
    pub speech_output: SpeechOutputConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vocalis").join("config.toml"))
    }

    /// Load the user's config, falling back to defaults, then apply the environment
    pub fn load() -> Self {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path).unwrap_or_else(|e| {
                warn!("Ignoring config file {:?}: {}", path, e);
                Self::default()
            }),
            _ => Self::default(),
        };

        config.with_env_overrides(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| VocalisError::ConfigError(e.to_string()))
    }

    /// Apply overrides from `lookup` (the process environment in production)
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.model.api_key = key;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.model.model = model;
        }
        self
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_speech_input(mut self, speech_input: SpeechInputConfig) -> Self {
        self.speech_input = speech_input;
        self
    }

    pub fn with_speech_output(mut self, speech_output: SpeechOutputConfig) -> Self {
        self.speech_output = speech_output;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage.data_dir = Some(dir.into());
        self
    }
}
