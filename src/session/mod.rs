//! Conversation state and its durable mirror
//!
//! - **store**: key-value persistence of JSON records
//! - **model**: the active conversation and the chat archive

pub mod model;
pub mod store;

pub use model::{preview_text, SessionModel, CHAT_HISTORY_KEY, CURRENT_CHAT_KEY, EMPTY_PREVIEW};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
