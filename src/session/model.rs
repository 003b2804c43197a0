//! The active conversation and the archive of past conversations
//!
//! Both live in memory and are written through to the store after every
//! change. The store is only read in [`SessionModel::init`].

use crate::messages::{ArchiveEntry, Message};
use crate::session::store::{load_json, save_json, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Store key of the active conversation
pub const CURRENT_CHAT_KEY: &str = "currentChat";

/// Store key of the chat archive
pub const CHAT_HISTORY_KEY: &str = "chatHistory";

/// Preview shown for a conversation without messages
pub const EMPTY_PREVIEW: &str = "Empty chat";

const PREVIEW_CHARS: usize = 30;

pub struct SessionModel {
    store: Box<dyn KeyValueStore>,
    conversation: Vec<Message>,
    archive: Vec<ArchiveEntry>,
}

impl SessionModel {
    /// Restore state from `store`; unreadable records start out empty
    pub fn init(store: Box<dyn KeyValueStore>) -> Self {
        let conversation: Vec<Message> = restore(store.as_ref(), CURRENT_CHAT_KEY);
        let archive: Vec<ArchiveEntry> = restore(store.as_ref(), CHAT_HISTORY_KEY);

        info!(
            "Session restored: {} messages, {} archived chats",
            conversation.len(),
            archive.len()
        );

        Self {
            store,
            conversation,
            archive,
        }
    }

    /// Nothing to release; the store already holds the latest state
    pub fn teardown(&mut self) {
        debug!("Session teardown");
    }

    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    pub fn archive(&self) -> &[ArchiveEntry] {
        &self.archive
    }

    pub fn append_message(&mut self, message: Message) {
        self.conversation.push(message);
        self.persist_conversation();
    }

    /// Archive the active conversation (if any) and start an empty one
    pub fn start_new_conversation(&mut self) -> Option<&ArchiveEntry> {
        let archived = !self.conversation.is_empty();
        if archived {
            let entry = ArchiveEntry::snapshot(&self.conversation);
            info!(
                "Archiving conversation {} ({} messages)",
                entry.id,
                entry.messages.len()
            );
            self.archive.insert(0, entry);
            self.persist_archive();
        }

        self.conversation.clear();
        self.persist_conversation();

        if archived {
            self.archive.first()
        } else {
            None
        }
    }

    /// Make a copy of `entry` the active conversation; the archive is untouched
    pub fn load_conversation(&mut self, entry: &ArchiveEntry) {
        debug!("Loading archived conversation {}", entry.id);
        self.conversation = entry.messages.clone();
        self.persist_conversation();
    }

    fn persist_conversation(&mut self) {
        persist(self.store.as_mut(), CURRENT_CHAT_KEY, &self.conversation);
    }

    fn persist_archive(&mut self) {
        persist(self.store.as_mut(), CHAT_HISTORY_KEY, &self.archive);
    }
}

fn restore<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match load_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Ignoring unreadable record '{}': {}", key, e);
            T::default()
        }
    }
}

fn persist<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = save_json(store, key, value) {
        warn!("Failed to persist '{}': {}", key, e);
    }
}

/// Sidebar label for a conversation: its opening words
pub fn preview_text(messages: &[Message]) -> String {
    let Some(first) = messages.first() else {
        return EMPTY_PREVIEW.to_string();
    };

    let mut chars = first.content.chars();
    let preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}
