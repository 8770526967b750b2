//! Process-lifetime repository backed by a map.

use super::MemoryRepository;
use crate::error::MemoryError;
use crate::model::MessageRecord;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Transient repository; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    conversations: RwLock<HashMap<String, Vec<MessageRecord>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryRepository for InMemoryRepository {
    fn save_all(
        &self,
        conversation_id: &str,
        messages: &[MessageRecord],
    ) -> Result<(), MemoryError> {
        debug!(
            "saving conversation in memory (conversation_id={}, messages={})",
            conversation_id,
            messages.len()
        );
        self.conversations
            .write()
            .insert(conversation_id.to_string(), messages.to_vec());
        Ok(())
    }

    fn find_by_conversation_id(&self, conversation_id: &str) -> Vec<MessageRecord> {
        self.conversations
            .read()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    fn delete_by_conversation_id(&self, conversation_id: &str) -> Result<(), MemoryError> {
        self.conversations.write().remove(conversation_id);
        Ok(())
    }

    fn find_conversation_ids(&self) -> Result<Vec<String>, MemoryError> {
        let mut ids: Vec<String> = self.conversations.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
