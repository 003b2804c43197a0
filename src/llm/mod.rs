//! Remote language model integration
//!
//! - **config**: endpoint, model and key settings
//! - **client**: the HTTP client for the `generateContent` method
//! - **pipeline**: worker thread exchanging commands and events over channels
//!
//! # Usage
//!
//! ```rust,ignore
//! use vocalis::llm::{ModelCommand, ModelConfig, ModelEvent, ModelPipeline};
//! use uuid::Uuid;
//!
//! let pipeline = ModelPipeline::new(ModelConfig::new(api_key));
//! let cmd_tx = pipeline.command_sender();
//! let event_rx = pipeline.event_receiver();
//! pipeline.start_worker()?;
//!
//! cmd_tx.send(ModelCommand::Generate {
//!     prompt: "Hello!".to_string(),
//!     request_id: Uuid::new_v4(),
//! })?;
//!
//! match event_rx.recv()? {
//!     ModelEvent::Reply { text, .. } => println!("{}", text),
//!     ModelEvent::Failed { error, .. } => eprintln!("{}", error),
//!     ModelEvent::Shutdown => {}
//! }
//! ```

pub mod client;
pub mod config;
pub mod pipeline;

pub use client::GeminiClient;
pub use config::{ModelConfig, DEFAULT_BASE_URL};
pub use pipeline::{ModelCommand, ModelEvent, ModelPipeline};
