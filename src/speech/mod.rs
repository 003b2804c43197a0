//! Speech input and output
//!
//! The bridges ([`SpeechInput`], [`SpeechOutput`]) are engine-agnostic. The
//! engines are optional:
//! - speech-to-text with Whisper (`whisper` feature)
//! - text-to-speech with sherpa-rs VITS voices (`vits` feature)

pub mod config;
pub mod input;
pub mod output;
#[cfg(feature = "whisper")]
pub mod stt;
#[cfg(feature = "vits")]
pub mod tts;

pub use config::{SpeechInputConfig, SpeechOutputConfig, VoiceProfile};
pub use input::{SpeechEvent, SpeechInput, SpeechRecognizer};
pub use output::{select_voice, SpeechOutput, SpeechSynthesizer, Utterance, Voice};

/// The recognizer compiled into this build, if any
pub fn default_recognizer(config: &SpeechInputConfig) -> Option<Box<dyn SpeechRecognizer>> {
    #[cfg(feature = "whisper")]
    {
        Some(Box::new(stt::WhisperRecognizer::new(config.clone())))
    }

    #[cfg(not(feature = "whisper"))]
    {
        tracing::info!(
            "Built without the `whisper` feature; ignoring model {:?}",
            config.model_path
        );
        None
    }
}

/// The synthesizer compiled into this build, if one can start
pub fn default_synthesizer(config: &SpeechOutputConfig) -> Option<Box<dyn SpeechSynthesizer>> {
    #[cfg(feature = "vits")]
    {
        match tts::VitsSynthesizer::new(config) {
            Ok(synth) => Some(Box::new(synth)),
            Err(e) => {
                tracing::warn!("Speech output unavailable: {}", e);
                None
            }
        }
    }

    #[cfg(not(feature = "vits"))]
    {
        tracing::info!(
            "Built without the `vits` feature; {} configured voice(s) unused",
            config.voices.len()
        );
        None
    }
}
