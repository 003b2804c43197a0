//! Remote model configuration

use serde::{Deserialize, Serialize};

/// Default public endpoint of the generative language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the remote model client
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// API key sent with every request
    pub api_key: String,

    /// Model identifier, e.g. `gemini-pro`
    pub model: String,

    /// Scheme and host of the API, without a trailing slash
    pub base_url: String,

    /// Pending request capacity of the pipeline channels
    pub queue_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-pro".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            queue_size: 16,
        }
    }
}

impl ModelConfig {
    /// Create a configuration for the default model with the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at another host (used for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of the `generateContent` method for the configured model
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ModelConfig::new("secret")
            .with_model("gemini-1.5-flash")
            .with_base_url("http://localhost:8080/");

        assert!(config.has_api_key());
        assert_eq!(
            config.generate_url(),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
