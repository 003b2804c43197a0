//! Speech output bridge

use crate::messages::sanitize_for_speech;
use crate::speech::config::SpeechOutputConfig;
use crate::Result;
use tracing::{debug, info, warn};

/// A voice offered by a synthesizer
#[derive(Clone, Debug, PartialEq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

/// Delivery parameters for one utterance; replies always use the defaults
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// `None` selects the engine default
    pub voice: Option<Voice>,
}

impl Default for Utterance {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }
}

/// A text-to-speech engine
pub trait SpeechSynthesizer {
    fn voices(&self) -> Vec<Voice>;

    /// Stop the current utterance and drop anything queued
    fn cancel(&mut self);

    fn speak(&mut self, text: &str, utterance: &Utterance) -> Result<()>;
}

/// First voice with an English language tag
pub fn select_voice(voices: &[Voice]) -> Option<Voice> {
    voices.iter().find(|v| v.lang.starts_with("en-")).cloned()
}

pub struct SpeechOutput {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    enabled: bool,
}

impl SpeechOutput {
    pub fn new(synthesizer: Option<Box<dyn SpeechSynthesizer>>, config: &SpeechOutputConfig) -> Self {
        Self {
            synthesizer,
            enabled: config.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_synthesizer(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Flip the speaker; turning it off silences the current utterance
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.cancel();
        }
        info!("Speech output {}", if self.enabled { "on" } else { "off" });
        self.enabled
    }

    pub fn cancel(&mut self) {
        if let Some(synth) = self.synthesizer.as_mut() {
            synth.cancel();
        }
    }

    /// Speak `text` in place of whatever is playing
    pub fn speak(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        let Some(synth) = self.synthesizer.as_mut() else {
            return;
        };

        synth.cancel();

        let spoken = sanitize_for_speech(text);
        if spoken.trim().is_empty() {
            debug!("Nothing to speak");
            return;
        }

        let utterance = Utterance {
            voice: select_voice(&synth.voices()),
            ..Utterance::default()
        };

        if let Err(e) = synth.speak(&spoken, &utterance) {
            warn!("Speech synthesis failed: {}", e);
        }
    }
}
