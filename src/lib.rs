pub mod audio;
pub mod integration;
pub mod llm;
pub mod messages;
pub mod session;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VocalisError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("TTS error: {0}")]
    TTSError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Image error: {0}")]
    ImageError(String),
}

impl From<std::io::Error> for VocalisError {
    fn from(e: std::io::Error) -> Self {
        VocalisError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for VocalisError {
    fn from(e: serde_json::Error) -> Self {
        VocalisError::StorageError(e.to_string())
    }
}

impl From<reqwest::Error> for VocalisError {
    fn from(e: reqwest::Error) -> Self {
        VocalisError::RequestError(e.to_string())
    }
}

impl VocalisError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            VocalisError::AudioDeviceError(_) => false,
            // Model errors require restarting
            VocalisError::ModelLoadError(_) => false,
            // These are typically transient errors
            VocalisError::TranscriptionError(_) => true,
            VocalisError::RequestError(_) => true,
            VocalisError::ResponseError(_) => true,
            VocalisError::TTSError(_) => true,
            VocalisError::StorageError(_) => true,
            VocalisError::IOError(_) => false,
            VocalisError::AudioProcessingError(_) => true,
            VocalisError::ConfigError(_) => false,
            VocalisError::ChannelError(_) => false,
            VocalisError::ImageError(_) => true,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            VocalisError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            VocalisError::ModelLoadError(_) => {
                "Failed to load a speech model. Please verify model files are present.".to_string()
            }
            VocalisError::TranscriptionError(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            VocalisError::RequestError(_) | VocalisError::ResponseError(_) => {
                "Sorry, I encountered an error. Please try again.".to_string()
            }
            VocalisError::TTSError(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            VocalisError::StorageError(_) => "Saved chats could not be read.".to_string(),
            VocalisError::IOError(_) => "File system error occurred.".to_string(),
            VocalisError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            VocalisError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            VocalisError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            VocalisError::ImageError(_) => "The image could not be read.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VocalisError>;
