use parking_lot::Mutex;
use parley_memory::{InMemoryRepository, MemoryError, MemoryRepository, MessageRecord};
use std::io;

/// Repository whose writes fail while reads are served from memory.
#[derive(Default)]
pub struct FailingRepository {
    inner: InMemoryRepository,
    attempts: Mutex<usize>,
}

impl FailingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rejected `save_all` calls.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

impl MemoryRepository for FailingRepository {
    fn save_all(
        &self,
        _conversation_id: &str,
        _messages: &[MessageRecord],
    ) -> Result<(), MemoryError> {
        *self.attempts.lock() += 1;
        Err(MemoryError::Io(io::Error::other("disk full")))
    }

    fn find_by_conversation_id(&self, conversation_id: &str) -> Vec<MessageRecord> {
        self.inner.find_by_conversation_id(conversation_id)
    }

    fn delete_by_conversation_id(&self, conversation_id: &str) -> Result<(), MemoryError> {
        self.inner.delete_by_conversation_id(conversation_id)
    }

    fn find_conversation_ids(&self) -> Result<Vec<String>, MemoryError> {
        self.inner.find_conversation_ids()
    }
}
