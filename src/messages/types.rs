use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Content stored alongside an uploaded image in place of text
pub const UPLOADED_IMAGE_PLACEHOLDER: &str = "[Uploaded Image]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Data URI of an uploaded image, only set on user messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            image: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// A user message carrying an uploaded image
    pub fn uploaded_image(data_uri: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: UPLOADED_IMAGE_PLACEHOLDER.to_string(),
            image: Some(data_uri.into()),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Snapshot of a finished conversation kept in the chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub id: String,
    pub messages: Vec<Message>,
    pub timestamp: String,
}

impl ArchiveEntry {
    /// Archive a copy of `messages` stamped with the current time
    pub fn snapshot(messages: &[Message]) -> Self {
        Self::snapshot_at(messages, Local::now())
    }

    pub fn snapshot_at(messages: &[Message], now: DateTime<Local>) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            messages: messages.to_vec(),
            timestamp: now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        }
    }
}
