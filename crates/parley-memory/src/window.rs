//! Bounded, per-conversation message window over a repository.

use crate::error::MemoryError;
use crate::model::{ChatMessage, MessageRecord};
use crate::repository::MemoryRepository;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Default number of messages retained per conversation.
pub const DEFAULT_MAX_MESSAGES: usize = 10;

/// Conversation memory keeping the most recent `capacity` messages.
///
/// Every mutation follows append, trim, persist. Calls on the same
/// conversation are serialized; distinct conversations proceed independently.
pub struct WindowedChatMemory {
    repository: Arc<dyn MemoryRepository>,
    capacity: usize,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WindowedChatMemory {
    /// Create a window of the given capacity over a repository.
    pub fn new(
        repository: Arc<dyn MemoryRepository>,
        capacity: usize,
    ) -> Result<Self, MemoryError> {
        if capacity == 0 {
            return Err(MemoryError::InvalidCapacity(capacity));
        }
        Ok(Self {
            repository,
            capacity,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Create a window with [`DEFAULT_MAX_MESSAGES`].
    pub fn with_default_capacity(repository: Arc<dyn MemoryRepository>) -> Self {
        Self {
            repository,
            capacity: DEFAULT_MAX_MESSAGES,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Maximum retained messages per conversation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Backing repository.
    pub fn repository(&self) -> Arc<dyn MemoryRepository> {
        self.repository.clone()
    }

    /// Messages currently retained for a conversation, oldest first.
    pub fn get(&self, conversation_id: &str) -> Vec<MessageRecord> {
        self.with_conversation(conversation_id, || {
            let mut records = self.repository.find_by_conversation_id(conversation_id);
            evict_oldest(&mut records, self.capacity);
            records
        })
    }

    /// Append messages, evict from the front down to capacity, then persist.
    ///
    /// Returns once the repository has acknowledged the write.
    pub fn add(
        &self,
        conversation_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<(), MemoryError> {
        self.with_conversation(conversation_id, || {
            let mut records = self.repository.find_by_conversation_id(conversation_id);
            if messages.is_empty() && records.len() <= self.capacity {
                debug!(
                    "skipping empty add (conversation_id={}, retained={})",
                    conversation_id,
                    records.len()
                );
                return Ok(());
            }

            let added = messages.len();
            let mut next_sequence = records.last().map_or(0, |record| record.sequence + 1);
            for message in messages {
                records.push(MessageRecord::from_message(next_sequence, message));
                next_sequence += 1;
            }
            let evicted = evict_oldest(&mut records, self.capacity);

            self.repository.save_all(conversation_id, &records)?;
            debug!(
                "updated conversation window (conversation_id={}, added={}, evicted={}, retained={})",
                conversation_id,
                added,
                evicted,
                records.len()
            );
            Ok(())
        })
    }

    /// Drop all retained messages for a conversation.
    pub fn clear(&self, conversation_id: &str) -> Result<(), MemoryError> {
        self.with_conversation(conversation_id, || {
            self.repository.delete_by_conversation_id(conversation_id)
        })
    }

    /// Identifiers of conversations with stored messages.
    pub fn conversation_ids(&self) -> Result<Vec<String>, MemoryError> {
        self.repository.find_conversation_ids()
    }

    /// Run `f` while holding the conversation's lock.
    fn with_conversation<T>(&self, conversation_id: &str, f: impl FnOnce() -> T) -> T {
        let lock = self
            .locks
            .lock()
            .entry(conversation_id.to_string())
            .or_default()
            .clone();
        let result = {
            let _guard = lock.lock();
            f()
        };
        // Only the map and this call hold the lock: nobody else is waiting.
        let mut locks = self.locks.lock();
        if Arc::strong_count(&lock) == 2 {
            locks.remove(conversation_id);
        }
        result
    }
}

/// Drop records from the front until at most `capacity` remain.
fn evict_oldest(records: &mut Vec<MessageRecord>, capacity: usize) -> usize {
    let excess = records.len().saturating_sub(capacity);
    records.drain(..excess);
    excess
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MAX_MESSAGES, WindowedChatMemory};
    use crate::error::MemoryError;
    use crate::model::{ChatMessage, MessageRecord, Role};
    use crate::repository::{InMemoryRepository, MemoryRepository};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Repository wrapper counting writes.
    #[derive(Default)]
    struct CountingRepository {
        inner: InMemoryRepository,
        saves: Mutex<usize>,
    }

    impl MemoryRepository for CountingRepository {
        fn save_all(
            &self,
            conversation_id: &str,
            messages: &[MessageRecord],
        ) -> Result<(), MemoryError> {
            *self.saves.lock() += 1;
            self.inner.save_all(conversation_id, messages)
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

    fn contents(records: &[MessageRecord]) -> Vec<String> {
        records.iter().map(|record| record.content.clone()).collect()
    }

    fn memory(capacity: usize) -> WindowedChatMemory {
        WindowedChatMemory::new(Arc::new(InMemoryRepository::new()), capacity).expect("memory")
    }

    #[test]
    fn keeps_most_recent_messages_one_at_a_time() {
        let memory = memory(3);
        for index in 1..=5 {
            memory
                .add("c1", vec![ChatMessage::user(format!("M{index}"))])
                .expect("add");
        }
        assert_eq!(contents(&memory.get("c1")), vec!["M3", "M4", "M5"]);
    }

    #[test]
    fn truncates_oversized_single_add() {
        let memory = memory(3);
        memory
            .add("c1", vec![ChatMessage::user("old")])
            .expect("add");
        let batch = (1..=5)
            .map(|index| ChatMessage::assistant(format!("B{index}")))
            .collect();
        memory.add("c1", batch).expect("add batch");

        let window = memory.get("c1");
        assert_eq!(contents(&window), vec!["B3", "B4", "B5"]);
        assert!(window.iter().all(|record| record.role == Role::Assistant));
    }

    #[test]
    fn sequences_stay_monotonic_across_evictions() {
        let memory = memory(2);
        for index in 0..4 {
            memory
                .add("c1", vec![ChatMessage::user(format!("m{index}"))])
                .expect("add");
        }
        let sequences: Vec<u64> = memory.get("c1").iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![2, 3]);
    }

    #[test]
    fn conversations_are_isolated() {
        let memory = memory(2);
        memory
            .add("a", vec![ChatMessage::user("a1"), ChatMessage::assistant("a2")])
            .expect("add a");
        memory
            .add("b", vec![ChatMessage::user("b1")])
            .expect("add b");
        memory.clear("b").expect("clear b");

        assert_eq!(contents(&memory.get("a")), vec!["a1", "a2"]);
        assert_eq!(memory.get("b"), Vec::new());
        assert_eq!(memory.conversation_ids().expect("ids"), vec!["a".to_string()]);
    }

    #[test]
    fn empty_add_within_capacity_skips_the_write() {
        let repo = Arc::new(CountingRepository::default());
        let memory = WindowedChatMemory::new(repo.clone(), 2).expect("memory");
        memory.add("c1", Vec::new()).expect("empty add");
        assert_eq!(*repo.saves.lock(), 0);
        assert_eq!(memory.conversation_ids().expect("ids"), Vec::<String>::new());

        memory
            .add("c1", vec![ChatMessage::user("hi")])
            .expect("add");
        memory.add("c1", Vec::new()).expect("empty add");
        assert_eq!(*repo.saves.lock(), 1);
    }

    #[test]
    fn empty_add_trims_oversized_stored_window() {
        let repo = Arc::new(CountingRepository::default());
        let stored: Vec<MessageRecord> = (0..4)
            .map(|index| MessageRecord::from_message(index, ChatMessage::user(index.to_string())))
            .collect();
        repo.save_all("c1", &stored).expect("seed");

        let memory = WindowedChatMemory::new(repo.clone(), 2).expect("memory");
        assert_eq!(contents(&memory.get("c1")), vec!["2", "3"]);
        memory.add("c1", Vec::new()).expect("empty add");
        assert_eq!(contents(&repo.find_by_conversation_id("c1")), vec!["2", "3"]);
    }

    #[test]
    fn rejects_zero_capacity() {
        let result = WindowedChatMemory::new(Arc::new(InMemoryRepository::new()), 0);
        assert!(matches!(result, Err(MemoryError::InvalidCapacity(0))));
        let memory = WindowedChatMemory::with_default_capacity(Arc::new(InMemoryRepository::new()));
        assert_eq!(memory.capacity(), DEFAULT_MAX_MESSAGES);
    }

    #[test]
    fn concurrent_adds_on_one_conversation_lose_nothing() {
        let memory = Arc::new(memory(1_000));
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let memory = memory.clone();
                scope.spawn(move || {
                    for index in 0..25 {
                        memory
                            .add("shared", vec![ChatMessage::user(format!("{worker}-{index}"))])
                            .expect("add");
                    }
                });
            }
        });

        let window = memory.get("shared");
        assert_eq!(window.len(), 200);
        let sequences: Vec<u64> = window.iter().map(|record| record.sequence).collect();
        assert_eq!(sequences, (0..200).collect::<Vec<u64>>());
        assert!(memory.locks.lock().is_empty());
    }
}
