//! Model pipeline for running remote requests off the UI thread
//!
//! Provides a channel-based interface: the UI sends [`ModelCommand`]s and
//! polls [`ModelEvent`]s, while a worker thread owns the HTTP client and a
//! tokio runtime.

use crate::llm::client::GeminiClient;
use crate::llm::config::ModelConfig;
use crate::{Result, VocalisError};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Commands that can be sent to the model pipeline
#[derive(Debug, Clone)]
pub enum ModelCommand {
    /// Ask the model to complete a prompt
    Generate {
        /// The prompt text
        prompt: String,
        /// Unique request ID for tracking
        request_id: Uuid,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the model pipeline
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// The model answered
    Reply {
        /// Completion text as returned by the API
        text: String,
        /// Request ID
        request_id: Uuid,
        /// Round-trip time in milliseconds
        elapsed_ms: u64,
    },

    /// The request failed
    Failed {
        /// Error description
        error: String,
        /// Request ID if applicable
        request_id: Option<Uuid>,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// Model pipeline with channel-based communication
pub struct ModelPipeline {
    /// Configuration
    config: ModelConfig,

    /// Command sender
    command_tx: Sender<ModelCommand>,

    /// Command receiver (for worker)
    command_rx: Receiver<ModelCommand>,

    /// Event sender (for worker)
    event_tx: Sender<ModelEvent>,

    /// Event receiver
    event_rx: Receiver<ModelEvent>,
}

impl ModelPipeline {
    /// Create a new model pipeline
    pub fn new(config: ModelConfig) -> Self {
        let (command_tx, command_rx) = bounded(config.queue_size);
        let (event_tx, event_rx) = bounded(config.queue_size);

        Self {
            config,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<ModelCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<ModelEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread
    pub fn start_worker(self) -> Result<thread::JoinHandle<()>> {
        let config = self.config;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;

        thread::Builder::new()
            .name("model-pipeline".into())
            .spawn(move || run_worker(config, command_rx, event_tx))
            .map_err(|e| VocalisError::ChannelError(format!("Failed to spawn model worker: {}", e)))
    }
}

fn run_worker(config: ModelConfig, command_rx: Receiver<ModelCommand>, event_tx: Sender<ModelEvent>) {
    info!("Model pipeline worker starting ({})", config.model);

    // Create tokio runtime for async operations
    let runtime = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            let _ = event_tx.send(ModelEvent::Failed {
                error: format!("Runtime creation failed: {}", e),
                request_id: None,
            });
            let _ = event_tx.send(ModelEvent::Shutdown);
            return;
        }
    };

    let has_key = config.has_api_key();
    let client = GeminiClient::new(config);

    loop {
        match command_rx.recv() {
            Ok(ModelCommand::Generate { prompt, request_id }) => {
                debug!("Processing generate request: {}", request_id);

                let start_time = Instant::now();
                let result = if has_key {
                    runtime.block_on(client.generate(&prompt))
                } else {
                    Err(VocalisError::ConfigError("No model API key configured".into()))
                };

                let event = match result {
                    Ok(text) => {
                        let elapsed_ms = start_time.elapsed().as_millis() as u64;
                        debug!("Reply for {}: {} chars in {}ms", request_id, text.len(), elapsed_ms);
                        ModelEvent::Reply {
                            text,
                            request_id,
                            elapsed_ms,
                        }
                    }
                    Err(e) => {
                        error!("Generation failed: {}", e);
                        ModelEvent::Failed {
                            error: e.to_string(),
                            request_id: Some(request_id),
                        }
                    }
                };

                if event_tx.send(event).is_err() {
                    break;
                }
            }

            Ok(ModelCommand::Shutdown) => {
                info!("Model pipeline worker shutting down");
                let _ = event_tx.send(ModelEvent::Shutdown);
                break;
            }

            Err(e) => {
                debug!("Command channel closed: {}", e);
                break;
            }
        }
    }

    info!("Model pipeline worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_pipeline_creation() {
        let pipeline = ModelPipeline::new(ModelConfig::default());
        let _cmd_tx = pipeline.command_sender();
        let _event_rx = pipeline.event_receiver();
        assert_eq!(pipeline.command_tx.capacity(), Some(16));
    }

    #[test]
    fn test_missing_api_key_fails_request() {
        let pipeline = ModelPipeline::new(ModelConfig::default());
        let cmd_tx = pipeline.command_sender();
        let event_rx = pipeline.event_receiver();
        let handle = pipeline.start_worker().unwrap();

        let request_id = Uuid::new_v4();
        cmd_tx
            .send(ModelCommand::Generate {
                prompt: "Hello".to_string(),
                request_id,
            })
            .unwrap();

        match event_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            ModelEvent::Failed { request_id: id, .. } => assert_eq!(id, Some(request_id)),
            other => panic!("unexpected event: {:?}", other),
        }

        cmd_tx.send(ModelCommand::Shutdown).unwrap();
        assert!(matches!(
            event_rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            ModelEvent::Shutdown
        ));
        handle.join().unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reply_event_from_remote() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "**Pong**" }] } }]
            })))
            .mount(&server)
            .await;

        let config = ModelConfig::new("test-key").with_base_url(server.uri());
        let pipeline = ModelPipeline::new(config);
        let cmd_tx = pipeline.command_sender();
        let event_rx = pipeline.event_receiver();
        pipeline.start_worker().unwrap();

        let request_id = Uuid::new_v4();
        cmd_tx
            .send(ModelCommand::Generate {
                prompt: "Ping".to_string(),
                request_id,
            })
            .unwrap();

        let event = tokio::task::spawn_blocking(move || event_rx.recv_timeout(Duration::from_secs(10)))
            .await
            .unwrap()
            .unwrap();

        match event {
            ModelEvent::Reply { text, request_id: id, .. } => {
                assert_eq!(text, "**Pong**");
                assert_eq!(id, request_id);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let _ = cmd_tx.send(ModelCommand::Shutdown);
    }
}
