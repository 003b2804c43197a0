//! Application state and interaction logic
//!
//! [`AppState`] owns the session and every collaborator handle. The UI calls
//! its operations in response to input and calls [`AppState::poll_events`]
//! once per frame to fold in results from the worker threads.

use crate::integration::image::{ImageEvent, ImageLoader};
use crate::llm::pipeline::{ModelCommand, ModelEvent};
use crate::messages::{extract_code, strip_emphasis_markup, ArchiveEntry, Message};
use crate::session::SessionModel;
use crate::speech::{SpeechInput, SpeechOutput};
use crossbeam_channel::{Receiver, Sender};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Assistant reply used when the model call fails
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// How long the "copied" indicator stays on a message
pub const COPY_INDICATOR: Duration = Duration::from_secs(2);

const LOG_CAPACITY: usize = 100;

/// Whether a prompt is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    AwaitingReply(Uuid),
}

/// Debug information displayed in the debug panel
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    /// Timing of the last model reply
    pub model_stats: String,
    /// Last error reported by any collaborator
    pub last_error: Option<String>,
    pub fps: f32,
    pub log_messages: VecDeque<String>,
}

impl DebugInfo {
    pub fn new() -> Self {
        Self {
            log_messages: VecDeque::with_capacity(LOG_CAPACITY),
            ..Default::default()
        }
    }

    pub fn add_log(&mut self, message: impl Into<String>) {
        if self.log_messages.len() >= LOG_CAPACITY {
            self.log_messages.pop_front();
        }
        self.log_messages.push_back(message.into());
    }
}

pub struct AppState {
    session: SessionModel,

    /// Text of the not-yet-sent message
    pub composer: String,

    /// Path typed into the attach field
    pub attach_path: String,

    pub sidebar_open: bool,
    pub show_debug_panel: bool,
    pub debug_info: DebugInfo,

    send_state: SendState,
    speech_input: SpeechInput,
    speech_output: SpeechOutput,
    copied: Option<(usize, Instant)>,

    model_tx: Option<Sender<ModelCommand>>,
    model_rx: Option<Receiver<ModelEvent>>,
    images: Option<ImageLoader>,

    frame_times: VecDeque<f64>,
}

impl AppState {
    /// State over `session` with no collaborators attached
    pub fn new(session: SessionModel) -> Self {
        Self {
            session,
            composer: String::new(),
            attach_path: String::new(),
            sidebar_open: false,
            show_debug_panel: false,
            debug_info: DebugInfo::new(),
            send_state: SendState::Idle,
            speech_input: SpeechInput::unsupported(),
            speech_output: SpeechOutput::new(None, &Default::default()),
            copied: None,
            model_tx: None,
            model_rx: None,
            images: None,
            frame_times: VecDeque::with_capacity(60),
        }
    }

    pub fn with_model_channels(mut self, tx: Sender<ModelCommand>, rx: Receiver<ModelEvent>) -> Self {
        self.model_tx = Some(tx);
        self.model_rx = Some(rx);
        self
    }

    pub fn with_speech_input(mut self, speech_input: SpeechInput) -> Self {
        self.speech_input = speech_input;
        self
    }

    pub fn with_speech_output(mut self, speech_output: SpeechOutput) -> Self {
        self.speech_output = speech_output;
        self
    }

    pub fn with_image_loader(mut self, images: ImageLoader) -> Self {
        self.images = Some(images);
        self
    }

    pub fn messages(&self) -> &[Message] {
        self.session.conversation()
    }

    pub fn archive(&self) -> &[ArchiveEntry] {
        self.session.archive()
    }

    pub fn send_state(&self) -> SendState {
        self.send_state
    }

    pub fn is_awaiting_reply(&self) -> bool {
        matches!(self.send_state, SendState::AwaitingReply(_))
    }

    pub fn speech_supported(&self) -> bool {
        self.speech_input.is_supported()
    }

    pub fn is_listening(&self) -> bool {
        self.speech_input.is_listening()
    }

    pub fn transcript(&self) -> &str {
        self.speech_input.transcript()
    }

    pub fn speaker_on(&self) -> bool {
        self.speech_output.is_enabled()
    }

    /// Send the composer text to the model
    pub fn send_message(&mut self) {
        let prompt = self.composer.trim().to_string();
        if prompt.is_empty() || self.is_awaiting_reply() {
            return;
        }

        self.session.append_message(Message::user(prompt.clone()));
        self.composer.clear();
        self.speech_input.reset_transcript();

        let request_id = Uuid::new_v4();
        self.send_state = SendState::AwaitingReply(request_id);
        debug!("Sending prompt {} ({} chars)", request_id, prompt.len());

        let delivered = match &self.model_tx {
            Some(tx) => tx.send(ModelCommand::Generate { prompt, request_id }).is_ok(),
            None => false,
        };

        if !delivered {
            self.fail_pending("Model pipeline is not running".to_string());
        }
    }

    /// Drain every collaborator channel; call once per frame
    pub fn poll_events(&mut self) {
        if self.speech_input.poll() {
            self.composer = self.speech_input.transcript().to_string();
        }

        let model_events: Vec<ModelEvent> = self
            .model_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in model_events {
            self.handle_model_event(event);
        }

        let image_events: Vec<ImageEvent> = self
            .images
            .as_ref()
            .map(|loader| loader.events().try_iter().collect())
            .unwrap_or_default();
        for event in image_events {
            self.handle_image_event(event);
        }

        if let Some((_, at)) = self.copied {
            if at.elapsed() >= COPY_INDICATOR {
                self.copied = None;
            }
        }
    }

    fn handle_model_event(&mut self, event: ModelEvent) {
        let pending = match self.send_state {
            SendState::AwaitingReply(id) => Some(id),
            SendState::Idle => None,
        };

        match event {
            ModelEvent::Reply {
                text,
                request_id,
                elapsed_ms,
            } => {
                if pending != Some(request_id) {
                    debug!("Ignoring reply for stale request {}", request_id);
                    return;
                }

                let reply = strip_emphasis_markup(&text);
                self.session.append_message(Message::assistant(reply.clone()));
                self.send_state = SendState::Idle;
                self.speech_output.speak(&reply);

                self.debug_info.model_stats = format!("Reply in {}ms, {} chars", elapsed_ms, reply.len());
                self.debug_info.add_log(format!("Reply received in {}ms", elapsed_ms));
            }

            ModelEvent::Failed { error, request_id } => {
                // A failure without an id means the worker itself died
                let applies = match request_id {
                    Some(id) => pending == Some(id),
                    None => pending.is_some(),
                };
                if applies {
                    self.fail_pending(error);
                } else {
                    warn!("Model failure outside a pending request: {}", error);
                    self.debug_info.last_error = Some(error);
                }
            }

            ModelEvent::Shutdown => {
                info!("Model pipeline shut down");
                self.debug_info.add_log("Model pipeline shut down");
                self.model_tx = None;
                if pending.is_some() {
                    self.fail_pending("Model pipeline shut down".to_string());
                }
            }
        }
    }

    fn fail_pending(&mut self, error: String) {
        error!("Model request failed: {}", error);
        self.session.append_message(Message::assistant(APOLOGY));
        self.send_state = SendState::Idle;
        self.debug_info.add_log(format!("Model error: {}", error));
        self.debug_info.last_error = Some(error);
    }

    fn handle_image_event(&mut self, event: ImageEvent) {
        match event {
            ImageEvent::Loaded { path, data_uri } => {
                info!("Attached image {:?}", path);
                self.session.append_message(Message::uploaded_image(data_uri));
            }
            ImageEvent::Failed { path, error } => {
                warn!("Could not attach {:?}: {}", path, error);
                self.debug_info.add_log(format!("Image error: {}", error));
                self.debug_info.last_error = Some(error);
            }
        }
    }

    /// Start or stop listening; starting clears the composer and transcript
    pub fn toggle_listening(&mut self) {
        if self.speech_input.is_listening() {
            self.speech_input.stop_listening();
        } else {
            self.composer.clear();
            self.speech_input.reset_transcript();
            self.speech_input.start_listening(true);
        }
    }

    pub fn toggle_speaker(&mut self) {
        self.speech_output.toggle();
    }

    /// Archive the current conversation and start an empty one
    pub fn start_new_chat(&mut self) {
        if let Some(entry) = self.session.start_new_conversation() {
            let id = entry.id.clone();
            self.debug_info.add_log(format!("Archived chat {}", id));
        }
        self.sidebar_open = false;
    }

    /// Replace the conversation with the archived chat at `index`
    pub fn load_chat(&mut self, index: usize) {
        let Some(entry) = self.session.archive().get(index).cloned() else {
            warn!("No archived chat at index {}", index);
            return;
        };
        self.session.load_conversation(&entry);
        self.sidebar_open = false;
    }

    /// Code to put on the clipboard for message `index`
    pub fn copy_code(&mut self, index: usize) -> Option<String> {
        let message = self.session.conversation().get(index)?;
        let code = extract_code(&message.content);
        self.copied = Some((index, Instant::now()));
        Some(code)
    }

    /// Whether message `index` shows the copied indicator
    pub fn is_copied(&self, index: usize) -> bool {
        matches!(self.copied, Some((i, at)) if i == index && at.elapsed() < COPY_INDICATOR)
    }

    /// Attach the image at `path`; the message is appended once it is read
    pub fn request_image(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        match &self.images {
            Some(loader) => {
                if let Err(e) = loader.request(path) {
                    warn!("Image request failed: {}", e);
                }
            }
            None => warn!("No image loader; ignoring {:?}", path),
        }
    }

    /// Stable display key for a message
    pub fn message_key(index: usize, message: &Message) -> String {
        let prefix: String = message.content.chars().take(20).collect();
        format!("message-{}-{}-{}", index, message.role.as_str(), prefix)
    }

    pub fn update_fps(&mut self, delta_time: f64) {
        self.frame_times.push_back(delta_time);
        if self.frame_times.len() > 60 {
            self.frame_times.pop_front();
        }

        let avg = self.frame_times.iter().sum::<f64>() / self.frame_times.len() as f64;
        self.debug_info.fps = if avg > 0.0 { (1.0 / avg) as f32 } else { 0.0 };
    }

    /// Stop workers and engines before exit
    pub fn shutdown(&mut self) {
        if self.speech_input.is_listening() {
            self.speech_input.stop_listening();
        }
        self.speech_output.cancel();
        if let Some(tx) = self.model_tx.take() {
            let _ = tx.send(ModelCommand::Shutdown);
        }
        self.session.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use crossbeam_channel::bounded;

    fn state() -> AppState {
        AppState::new(SessionModel::init(Box::new(MemoryStore::new())))
    }

    #[test]
    fn test_message_key() {
        let message = Message::assistant("The quick brown fox jumps over the lazy dog");
        assert_eq!(
            AppState::message_key(3, &message),
            "message-3-assistant-The quick brown fox "
        );
    }

    #[test]
    fn test_send_without_pipeline_apologizes() {
        let mut state = state();
        state.composer = "  hi  ".into();
        state.send_message();

        let messages = state.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("hi"));
        assert_eq!(messages[1], Message::assistant(APOLOGY));
        assert_eq!(state.send_state(), SendState::Idle);
    }

    #[test]
    fn test_stale_reply_is_ignored() {
        let (cmd_tx, _cmd_rx) = bounded(4);
        let (event_tx, event_rx) = bounded(4);
        let mut state = state().with_model_channels(cmd_tx, event_rx);

        state.composer = "question".into();
        state.send_message();
        event_tx
            .send(ModelEvent::Reply {
                text: "late".into(),
                request_id: Uuid::new_v4(),
                elapsed_ms: 1,
            })
            .unwrap();
        state.poll_events();

        assert_eq!(state.messages().len(), 1);
        assert!(state.is_awaiting_reply());
    }

    #[test]
    fn test_copy_code_marks_message() {
        let mut state = state();
        state.session.append_message(Message::assistant("Use `cargo run`"));

        assert_eq!(state.copy_code(0).as_deref(), Some("cargo run"));
        assert!(state.is_copied(0));
        assert!(!state.is_copied(1));
        assert!(state.copy_code(5).is_none());
    }

    #[test]
    fn test_debug_log_is_bounded() {
        let mut info = DebugInfo::new();
        for i in 0..150 {
            info.add_log(format!("line {}", i));
        }
        assert_eq!(info.log_messages.len(), LOG_CAPACITY);
        assert_eq!(info.log_messages.front().map(String::as_str), Some("line 50"));
    }
}
