//! Speech engine configuration

use crate::audio::SegmenterConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Microphone transcription settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechInputConfig {
    /// Whisper ggml model file
    pub model_path: PathBuf,

    /// Spoken language, `None` for auto-detection
    pub language: Option<String>,

    /// Threads used by whisper
    pub n_threads: i32,

    /// Speech probability above which a frame counts as speech
    pub vad_threshold: f32,

    /// Phrases shorter than this are dropped (seconds)
    pub min_segment_secs: f32,

    /// Phrases are cut at this length (seconds)
    pub max_segment_secs: f32,

    /// Pause that ends a phrase (seconds)
    pub silence_secs: f32,
}

impl Default for SpeechInputConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            language: Some("en".to_string()),
            n_threads: 4,
            vad_threshold: 0.5,
            min_segment_secs: 0.5,
            max_segment_secs: 30.0,
            silence_secs: 0.8,
        }
    }
}

impl SpeechInputConfig {
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            sample_rate: 16000,
            min_segment_secs: self.min_segment_secs,
            max_segment_secs: self.max_segment_secs,
            silence_secs: self.silence_secs,
        }
    }
}

/// An installed VITS voice
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Display name
    pub name: String,

    /// BCP 47 language tag, e.g. `en-US`
    pub lang: String,

    /// ONNX model file
    pub model_path: PathBuf,

    /// Token table shipped with the model
    pub tokens_path: PathBuf,

    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,

    /// espeak-ng data directory for piper models
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub speaker_id: i32,
}

impl VoiceProfile {
    pub fn new(
        name: impl Into<String>,
        lang: impl Into<String>,
        model_path: impl Into<PathBuf>,
        tokens_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            model_path: model_path.into(),
            tokens_path: tokens_path.into(),
            lexicon_path: None,
            data_dir: None,
            speaker_id: 0,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Whether the model and token files are on disk
    pub fn is_installed(&self) -> bool {
        self.model_path.exists() && self.tokens_path.exists()
    }
}

/// Spoken reply settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechOutputConfig {
    /// Initial state of the speaker toggle
    pub enabled: bool,

    /// Voices offered to the synthesizer, in preference order
    pub voices: Vec<VoiceProfile>,
}

impl Default for SpeechOutputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            voices: vec![VoiceProfile::new(
                "Amy",
                "en-US",
                "models/vits-piper-en_US-amy-low/en_US-amy-low.onnx",
                "models/vits-piper-en_US-amy-low/tokens.txt",
            )
            .with_data_dir("models/vits-piper-en_US-amy-low/espeak-ng-data")],
        }
    }
}

impl SpeechOutputConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_voices(mut self, voices: Vec<VoiceProfile>) -> Self {
        self.voices = voices;
        self
    }
}
