//! Speech input bridge
//!
//! Wraps a [`SpeechRecognizer`] and folds its events into a running
//! transcript the controller can mirror into the composer.

use crate::Result;
use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

/// Notifications from a recognizer
#[derive(Clone, Debug, PartialEq)]
pub enum SpeechEvent {
    /// The engine began capturing
    Started,

    /// A phrase was recognized
    Phrase(String),

    /// The engine stopped capturing
    Stopped,

    /// Engine failure; listening may or may not continue
    Error(String),
}

/// A speech-to-text engine
///
/// Implementations deliver results asynchronously through the receiver
/// returned by [`SpeechRecognizer::events`].
pub trait SpeechRecognizer {
    /// Whether the engine can run on this machine
    fn is_available(&self) -> bool;

    /// Begin capturing; with `continuous` false, stop after the first phrase
    fn start(&mut self, continuous: bool) -> Result<()>;

    fn stop(&mut self);

    fn is_listening(&self) -> bool;

    fn events(&self) -> Receiver<SpeechEvent>;
}

pub struct SpeechInput {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    events: Option<Receiver<SpeechEvent>>,
    transcript: String,
    listening: bool,
}

impl SpeechInput {
    pub fn new(recognizer: Option<Box<dyn SpeechRecognizer>>) -> Self {
        let events = recognizer.as_ref().map(|r| r.events());
        Self {
            recognizer,
            events,
            transcript: String::new(),
            listening: false,
        }
    }

    /// A bridge with no engine behind it
    pub fn unsupported() -> Self {
        Self::new(None)
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer
            .as_ref()
            .map(|r| r.is_available())
            .unwrap_or(false)
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn reset_transcript(&mut self) {
        self.transcript.clear();
    }

    pub fn start_listening(&mut self, continuous: bool) {
        let Some(recognizer) = self.recognizer.as_mut() else {
            warn!("No speech recognizer available");
            return;
        };

        match recognizer.start(continuous) {
            Ok(()) => {
                info!("Listening (continuous: {})", continuous);
                self.listening = true;
            }
            Err(e) => warn!("Failed to start speech recognition: {}", e),
        }
    }

    pub fn stop_listening(&mut self) {
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.listening = false;
    }

    /// Drain pending engine events; true when the transcript changed
    pub fn poll(&mut self) -> bool {
        let Some(events) = self.events.as_ref() else {
            return false;
        };

        let mut changed = false;
        while let Ok(event) = events.try_recv() {
            match event {
                SpeechEvent::Started => self.listening = true,
                SpeechEvent::Stopped => self.listening = false,
                SpeechEvent::Phrase(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    debug!("Recognized phrase: {}", text);
                    if !self.transcript.is_empty() {
                        self.transcript.push(' ');
                    }
                    self.transcript.push_str(text);
                    changed = true;
                }
                SpeechEvent::Error(e) => warn!("Speech recognition error: {}", e),
            }
        }

        changed
    }
}
