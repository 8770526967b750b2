//! Memory config mapping.

use crate::error::ChatError;
use log::{debug, info};
use parking_lot::Mutex;
use parley_config::{ConfigError, MemoryBackend, MemoryConfig};
use parley_memory::{
    FileMemoryRepository, InMemoryRepository, MemoryError, MemoryRepository, MessageCodec,
    WindowedChatMemory,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, Weak};

/// File-backed memories alive in this process, keyed by canonical directory.
///
/// Per-conversation locks live inside a [`WindowedChatMemory`], so every
/// client writing to one directory must go through the same instance.
fn file_memories() -> &'static Mutex<HashMap<PathBuf, Weak<WindowedChatMemory>>> {
    static MEMORIES: OnceLock<Mutex<HashMap<PathBuf, Weak<WindowedChatMemory>>>> =
        OnceLock::new();
    MEMORIES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Build the repository selected by `config.backend`.
pub fn repository_from_config(
    config: &MemoryConfig,
) -> Result<Arc<dyn MemoryRepository>, ChatError> {
    let repository: Arc<dyn MemoryRepository> = match config.backend {
        MemoryBackend::Transient => Arc::new(InMemoryRepository::new()),
        MemoryBackend::File => Arc::new(FileMemoryRepository::new(
            config.resolved_path(),
            MessageCodec::new(),
        )?),
    };
    Ok(repository)
}

/// Build the windowed memory described by `config`.
///
/// Transient memories are always fresh. File memories are shared by every
/// caller in the process that names the same directory, and a second caller
/// asking for a different capacity is rejected.
pub fn memory_from_config(config: &MemoryConfig) -> Result<Arc<WindowedChatMemory>, ChatError> {
    let memory = match config.backend {
        MemoryBackend::Transient => Arc::new(WindowedChatMemory::new(
            repository_from_config(config)?,
            config.capacity,
        )?),
        MemoryBackend::File => shared_file_memory(config)?,
    };
    info!(
        "conversation memory ready (backend={:?}, capacity={})",
        config.backend, config.capacity
    );
    Ok(memory)
}

fn shared_file_memory(config: &MemoryConfig) -> Result<Arc<WindowedChatMemory>, ChatError> {
    let repository = FileMemoryRepository::new(config.resolved_path(), MessageCodec::new())?;
    let root = repository
        .root()
        .canonicalize()
        .map_err(MemoryError::from)?;

    let mut memories = file_memories().lock();
    memories.retain(|_, memory| memory.strong_count() > 0);
    if let Some(existing) = memories.get(&root).and_then(Weak::upgrade) {
        if existing.capacity() != config.capacity {
            return Err(ConfigError::InvalidField {
                path: "memory.capacity".to_string(),
                message: format!(
                    "{} is already open with capacity {}",
                    root.display(),
                    existing.capacity()
                ),
            }
            .into());
        }
        debug!("reusing file memory (root={})", root.display());
        return Ok(existing);
    }

    let memory = Arc::new(WindowedChatMemory::new(
        Arc::new(repository),
        config.capacity,
    )?);
    memories.insert(root, Arc::downgrade(&memory));
    Ok(memory)
}

#[cfg(test)]
mod tests {
    use super::memory_from_config;
    use crate::error::ChatError;
    use parley_config::{ConfigError, MemoryBackend, MemoryConfig};
    use parley_memory::{ChatMessage, MemoryError};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn file_config(path: &std::path::Path, capacity: usize) -> MemoryConfig {
        MemoryConfig {
            backend: MemoryBackend::File,
            capacity,
            path: Some(path.to_string_lossy().into_owned()),
        }
    }

    #[test]
    fn transient_backend_is_default() {
        let memory = memory_from_config(&MemoryConfig::default()).expect("memory");
        assert_eq!(memory.capacity(), 10);
        memory
            .add("c1", vec![ChatMessage::user("hi")])
            .expect("add");
        assert_eq!(memory.get("c1").len(), 1);

        let other = memory_from_config(&MemoryConfig::default()).expect("memory");
        assert!(!Arc::ptr_eq(&memory, &other));
        assert!(other.get("c1").is_empty());
    }

    #[test]
    fn file_backend_writes_under_configured_path() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("memory");
        let memory = memory_from_config(&file_config(&root, 4)).expect("memory");
        memory
            .add("c1", vec![ChatMessage::user("hi")])
            .expect("add");
        assert!(root.join("c1.prly").is_file());
    }

    #[test]
    fn same_directory_shares_one_memory() {
        let temp = tempdir().expect("tempdir");
        let first = memory_from_config(&file_config(temp.path(), 4)).expect("memory");
        let second = memory_from_config(&file_config(&temp.path().join("."), 4)).expect("memory");
        assert!(Arc::ptr_eq(&first, &second));

        let err = memory_from_config(&file_config(temp.path(), 5))
            .err()
            .expect("error");
        assert!(matches!(
            err,
            ChatError::Config(ConfigError::InvalidField { .. })
        ));
    }

    #[test]
    fn dropped_file_memory_is_not_reused() {
        let temp = tempdir().expect("tempdir");
        let first = memory_from_config(&file_config(temp.path(), 4)).expect("memory");
        drop(first);
        let second = memory_from_config(&file_config(temp.path(), 6)).expect("memory");
        assert_eq!(second.capacity(), 6);
    }

    #[test]
    fn concurrent_clients_on_one_directory_lose_nothing() {
        let temp = tempdir().expect("tempdir");
        let config = file_config(temp.path(), 1_000);
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let config = config.clone();
                scope.spawn(move || {
                    let memory = memory_from_config(&config).expect("memory");
                    for index in 0..10 {
                        memory
                            .add("shared", vec![ChatMessage::user(format!("{worker}-{index}"))])
                            .expect("add");
                    }
                });
            }
        });

        let memory = memory_from_config(&config).expect("memory");
        assert_eq!(memory.get("shared").len(), 40);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = MemoryConfig {
            capacity: 0,
            ..MemoryConfig::default()
        };
        let err = memory_from_config(&config).err().expect("error");
        assert!(matches!(
            err,
            ChatError::Memory(MemoryError::InvalidCapacity(0))
        ));
    }
}
