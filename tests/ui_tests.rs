//! UI automation tests using egui_kittest and AccessKit
//!
//! These tests render the real [`VocalisApp`] panels and interact with them
//! through the accessibility tree.

mod common;

use common::Fixture;
use crossbeam_channel::{Receiver, Sender};
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use vocalis::llm::{ModelCommand, ModelEvent};
use vocalis::messages::Message;
use vocalis::session::{MemoryStore, SessionModel};
use vocalis::speech::SpeechEvent;
use vocalis::ui::{AppState, VocalisApp, UNSUPPORTED_NOTICE};

/// The app plus the test's ends of its channels
struct TestApp {
    app: VocalisApp,
    commands: Receiver<ModelCommand>,
    model_events: Sender<ModelEvent>,
    speech_events: Sender<SpeechEvent>,
}

impl TestApp {
    fn new() -> Self {
        let fx = Fixture::new();
        Self {
            app: VocalisApp::from_state(fx.state),
            commands: fx.commands,
            model_events: fx.model_events,
            speech_events: fx.speech_events,
        }
    }

    fn with_messages(mut self, messages: &[Message]) -> Self {
        for message in messages {
            let id = {
                let state = self.app.state_mut();
                state.composer = message.content.clone();
                state.send_message();
                match self.commands.try_recv() {
                    Ok(ModelCommand::Generate { request_id, .. }) => request_id,
                    other => panic!("unexpected command: {:?}", other),
                }
            };
            self.model_events
                .send(ModelEvent::Reply {
                    text: format!("Echo: {}", message.content),
                    request_id: id,
                    elapsed_ms: 1,
                })
                .unwrap();
            self.app.state_mut().poll_events();
        }
        self
    }

    fn state(&self) -> &AppState {
        self.app.state()
    }
}

fn harness(app: TestApp) -> Harness<'static, TestApp> {
    Harness::builder()
        .with_size(egui::Vec2::new(800.0, 600.0))
        .build_state(|ctx, test: &mut TestApp| test.app.show(ctx), app)
}

#[test]
fn test_unsupported_environment_shows_only_notice() {
    let state = AppState::new(SessionModel::init(Box::new(MemoryStore::new())));
    let mut harness = Harness::builder()
        .with_size(egui::Vec2::new(800.0, 600.0))
        .build_state(|ctx, app: &mut VocalisApp| app.show(ctx), VocalisApp::from_state(state));

    harness.run();

    let _notice = harness.get_by_label(UNSUPPORTED_NOTICE);
    assert!(harness.query_by_label("Message input").is_none());
    assert!(harness.query_by_label("Send message").is_none());
}

#[test]
fn test_controls_are_accessible() {
    let mut harness = harness(TestApp::new());
    harness.run();

    let _input = harness.get_by_label("Message input");
    let _send = harness.get_by_label("Send message");
    let _mic = harness.get_by_label("Start listening");
    let _speaker = harness.get_by_label("Turn off text-to-speech");
    let _attach = harness.get_by_label("Image path");
    let _history = harness.get_by_label("Open chat history");
}

#[test]
fn test_type_and_send_message() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Message input").focus();
    harness.run();
    harness.get_by_label("Message input").type_text("What is 2 + 2?");
    harness.run();
    assert_eq!(harness.state().state().composer, "What is 2 + 2?");

    harness.get_by_label("Send message").click();
    harness.run();

    assert_eq!(harness.state().state().messages(), &[Message::user("What is 2 + 2?")]);
    assert!(harness.state().state().is_awaiting_reply());
    let _typing = harness.get_by_label("Assistant is typing");

    let request_id = match harness.state().commands.try_recv() {
        Ok(ModelCommand::Generate { prompt, request_id }) => {
            assert_eq!(prompt, "What is 2 + 2?");
            request_id
        }
        other => panic!("unexpected command: {:?}", other),
    };

    harness
        .state()
        .model_events
        .send(ModelEvent::Reply {
            text: "2 + 2 equals **4**.".into(),
            request_id,
            elapsed_ms: 5,
        })
        .unwrap();
    harness.run();

    let _user = harness.get_by_label("User message: What is 2 + 2?");
    let _assistant = harness.get_by_label("Assistant response: 2 + 2 equals 4.");
    assert!(harness.query_by_label("Assistant is typing").is_none());
}

#[test]
fn test_cannot_send_empty_message() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    assert!(harness.state().state().messages().is_empty());
    assert!(harness.state().commands.try_recv().is_err());
}

#[test]
fn test_spoken_phrase_fills_composer() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Start listening").click();
    harness.run();
    let _stop = harness.get_by_label("Stop listening");

    harness
        .state()
        .speech_events
        .send(SpeechEvent::Phrase("open the pod bay doors".into()))
        .unwrap();
    harness.run();

    assert_eq!(harness.state().state().composer, "open the pod bay doors");
}

#[test]
fn test_speaker_toggle() {
    let mut harness = harness(TestApp::new());
    harness.run();

    harness.get_by_label("Turn off text-to-speech").click();
    harness.run();

    assert!(!harness.state().state().speaker_on());
    let _on = harness.get_by_label("Turn on text-to-speech");
}

#[test]
fn test_sidebar_new_chat_and_load() {
    let app = TestApp::new().with_messages(&[Message::user("Tell me a joke")]);
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Open chat history").click();
    harness.run();
    harness.get_by_label("New chat").click();
    harness.run();

    assert!(harness.state().state().messages().is_empty());
    assert_eq!(harness.state().state().archive().len(), 1);
    assert!(!harness.state().state().sidebar_open);

    harness.get_by_label("Open chat history").click();
    harness.run();
    harness.get_by_label("Open chat: Tell me a joke").click();
    harness.run();

    assert_eq!(harness.state().state().messages().len(), 2);
    let _restored = harness.get_by_label("Assistant response: Echo: Tell me a joke");
}

#[test]
fn test_copy_code_button() {
    let mut app = TestApp::new();
    let request_id = {
        let state = app.app.state_mut();
        state.composer = "How do I build?".into();
        state.send_message();
        match app.commands.try_recv() {
            Ok(ModelCommand::Generate { request_id, .. }) => request_id,
            other => panic!("unexpected command: {:?}", other),
        }
    };
    app.model_events
        .send(ModelEvent::Reply {
            text: "Run `cargo build` in the project root".into(),
            request_id,
            elapsed_ms: 1,
        })
        .unwrap();

    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Copy code").click();
    harness.run();

    assert!(harness.state().state().is_copied(1));
    let _copied = harness.get_by_label("Copied");
}

#[test]
fn test_user_messages_have_no_copy_button() {
    let mut harness = harness(TestApp::new().with_messages(&[Message::user("plain `code`")]));
    harness.run();

    // Only the echoed assistant reply offers a copy button
    let _copy = harness.get_by_label("Copy code");
    let _user = harness.get_by_label("User message: plain `code`");
}
