//! Configuration, attachments and start-up wiring

pub mod config;
pub mod image;
pub mod orchestrator;

pub use config::{AppConfig, StorageConfig};
pub use image::{ImageEvent, ImageLoader};
pub use orchestrator::Orchestrator;
