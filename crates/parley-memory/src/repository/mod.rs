//! Persistence contract for conversation message sequences.

mod file;
mod in_memory;

use crate::error::MemoryError;
use crate::model::MessageRecord;

pub use file::{FILE_EXTENSION, FileMemoryRepository, validate_conversation_id};
pub use in_memory::InMemoryRepository;

/// Storage backend for conversation windows.
///
/// Repositories only store what they are given. Window size policy lives in
/// [`WindowedChatMemory`](crate::WindowedChatMemory).
pub trait MemoryRepository: Send + Sync {
    /// Replace the stored sequence for a conversation.
    ///
    /// Callers pass the full desired sequence; nothing is appended.
    fn save_all(&self, conversation_id: &str, messages: &[MessageRecord])
    -> Result<(), MemoryError>;

    /// Load the stored sequence, or an empty one when nothing is stored.
    fn find_by_conversation_id(&self, conversation_id: &str) -> Vec<MessageRecord>;

    /// Remove all stored data for a conversation. Missing data is not an error.
    fn delete_by_conversation_id(&self, conversation_id: &str) -> Result<(), MemoryError>;

    /// List identifiers that currently have stored data.
    fn find_conversation_ids(&self) -> Result<Vec<String>, MemoryError>;
}
