//! Shared fakes for the integration tests

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;
use vocalis::llm::{ModelCommand, ModelEvent};
use vocalis::session::{MemoryStore, SessionModel};
use vocalis::speech::{
    SpeechEvent, SpeechInput, SpeechOutput, SpeechOutputConfig, SpeechRecognizer, SpeechSynthesizer,
    Utterance, Voice,
};
use vocalis::ui::AppState;

/// Recognizer whose phrases are pushed by the test
pub struct FakeRecognizer {
    events_tx: Sender<SpeechEvent>,
    events_rx: Receiver<SpeechEvent>,
    listening: bool,
    starts: Arc<Mutex<Vec<bool>>>,
}

impl SpeechRecognizer for FakeRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, continuous: bool) -> vocalis::Result<()> {
        self.starts.lock().push(continuous);
        self.listening = true;
        let _ = self.events_tx.send(SpeechEvent::Started);
        Ok(())
    }

    fn stop(&mut self) {
        self.listening = false;
        let _ = self.events_tx.send(SpeechEvent::Stopped);
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    fn events(&self) -> Receiver<SpeechEvent> {
        self.events_rx.clone()
    }
}

/// Synthesizer that records what it was asked to say
pub struct FakeSynthesizer {
    spoken: Arc<Mutex<Vec<String>>>,
    cancels: Arc<Mutex<usize>>,
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            name: "Amy".into(),
            lang: "en-US".into(),
        }]
    }

    fn cancel(&mut self) {
        *self.cancels.lock() += 1;
    }

    fn speak(&mut self, text: &str, _utterance: &Utterance) -> vocalis::Result<()> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }
}

/// An [`AppState`] wired to fakes, plus the test's ends of every channel
pub struct Fixture {
    pub state: AppState,
    pub store: MemoryStore,
    pub commands: Receiver<ModelCommand>,
    pub model_events: Sender<ModelEvent>,
    pub speech_events: Sender<SpeechEvent>,
    pub starts: Arc<Mutex<Vec<bool>>>,
    pub spoken: Arc<Mutex<Vec<String>>>,
    pub cancels: Arc<Mutex<usize>>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let (command_tx, commands) = unbounded();
        let (model_events, event_rx) = unbounded();
        let (speech_events, speech_rx) = unbounded();

        let starts = Arc::new(Mutex::new(Vec::new()));
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let cancels = Arc::new(Mutex::new(0));

        let recognizer = FakeRecognizer {
            events_tx: speech_events.clone(),
            events_rx: speech_rx,
            listening: false,
            starts: starts.clone(),
        };
        let synthesizer = FakeSynthesizer {
            spoken: spoken.clone(),
            cancels: cancels.clone(),
        };

        let state = AppState::new(SessionModel::init(Box::new(store.clone())))
            .with_model_channels(command_tx, event_rx)
            .with_speech_input(SpeechInput::new(Some(Box::new(recognizer))))
            .with_speech_output(SpeechOutput::new(
                Some(Box::new(synthesizer)),
                &SpeechOutputConfig::default(),
            ));

        Self {
            state,
            store,
            commands,
            model_events,
            speech_events,
            starts,
            spoken,
            cancels,
        }
    }

    /// Id and prompt of the next Generate command
    pub fn next_request(&self) -> (Uuid, String) {
        match self.commands.try_recv() {
            Ok(ModelCommand::Generate { prompt, request_id }) => (request_id, prompt),
            other => panic!("expected a Generate command, got {:?}", other),
        }
    }

    /// Type `text` and send it, returning the id of the request
    pub fn send(&mut self, text: &str) -> Uuid {
        self.state.composer = text.to_string();
        self.state.send_message();
        self.next_request().0
    }

    pub fn reply(&self, request_id: Uuid, text: &str) {
        self.model_events
            .send(ModelEvent::Reply {
                text: text.to_string(),
                request_id,
                elapsed_ms: 42,
            })
            .unwrap();
    }

    pub fn fail(&self, request_id: Option<Uuid>, error: &str) {
        self.model_events
            .send(ModelEvent::Failed {
                error: error.to_string(),
                request_id,
            })
            .unwrap();
    }

    pub fn phrase(&self, text: &str) {
        self.speech_events.send(SpeechEvent::Phrase(text.to_string())).unwrap();
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}
