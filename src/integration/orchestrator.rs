//! Wires the collaborators together
//!
//! Builds the store, session, model pipeline, speech bridges and image
//! loader from an [`AppConfig`], starts their worker threads and hands the
//! channel ends to a fresh [`AppState`].

use crate::integration::config::AppConfig;
use crate::integration::image::ImageLoader;
use crate::llm::pipeline::ModelPipeline;
use crate::session::{JsonFileStore, KeyValueStore, SessionModel};
use crate::speech::{self, SpeechInput, SpeechOutput};
use crate::ui::state::AppState;
use crate::Result;
use tracing::{info, warn};

pub struct Orchestrator {
    config: AppConfig,
    store: Option<Box<dyn KeyValueStore>>,
}

impl Orchestrator {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: None,
        }
    }

    /// Use `store` instead of the JSON files under the data directory
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Start every worker and return the state the UI drives
    pub fn start(self) -> Result<AppState> {
        let Self { config, store } = self;

        let store = match store {
            Some(store) => store,
            None => {
                let dir = config.storage.resolved_dir()?;
                info!("Chat records in {:?}", dir);
                Box::new(JsonFileStore::new(dir))
            }
        };
        let session = SessionModel::init(store);

        if !config.model.has_api_key() {
            warn!(
                "No API key configured; set {} or add it to the config file",
                crate::integration::config::API_KEY_ENV
            );
        }
        let pipeline = ModelPipeline::new(config.model.clone());
        let model_tx = pipeline.command_sender();
        let model_rx = pipeline.event_receiver();
        pipeline.start_worker()?;
        info!("Model pipeline started ({})", config.model.model);

        let speech_input = SpeechInput::new(speech::default_recognizer(&config.speech_input));
        let speech_output = SpeechOutput::new(
            speech::default_synthesizer(&config.speech_output),
            &config.speech_output,
        );
        info!(
            "Speech input supported: {}, speech output available: {}",
            speech_input.is_supported(),
            speech_output.has_synthesizer()
        );

        let images = ImageLoader::start()?;

        let mut state = AppState::new(session)
            .with_model_channels(model_tx, model_rx)
            .with_speech_input(speech_input)
            .with_speech_output(speech_output)
            .with_image_loader(images);
        state.debug_info.add_log("Vocalis started");

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Message;
    use crate::session::{MemoryStore, CURRENT_CHAT_KEY};
    use tempfile::TempDir;

    #[test]
    fn test_start_restores_conversation() {
        let store = MemoryStore::new().with_record(
            CURRENT_CHAT_KEY,
            r#"[{"role":"user","content":"still here"}]"#,
        );

        let state = Orchestrator::new(AppConfig::default())
            .with_store(Box::new(store))
            .start()
            .unwrap();

        assert_eq!(state.messages(), &[Message::user("still here")]);
        assert!(!state.is_awaiting_reply());
    }

    #[test]
    fn test_start_uses_configured_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::default().with_data_dir(dir.path());

        let mut state = Orchestrator::new(config).start().unwrap();
        state.start_new_chat();

        assert!(dir.path().join("currentChat.json").exists());
    }
}
