//! Message models shared by repositories and the windowed memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Lowercase label used in logs and on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unsequenced message supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Message retained in a conversation window.
///
/// Records are immutable once appended. `sequence` is assigned by the
/// windowed memory and keeps increasing across evictions, so it reflects
/// insertion order even after the front of the window has been dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Position within the conversation.
    pub sequence: u64,
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Time the record was appended.
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    /// Stamp a caller message with its position in the conversation.
    pub fn from_message(sequence: u64, message: ChatMessage) -> Self {
        Self {
            sequence,
            role: message.role,
            content: message.content,
            created_at: Utc::now(),
        }
    }

    /// Strip the record back to the caller-facing message.
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

impl From<&MessageRecord> for ChatMessage {
    fn from(record: &MessageRecord) -> Self {
        record.to_message()
    }
}
