//! Conversation memory for parley.
//!
//! Holds the message model, the repository contract with its transient and
//! file-backed implementations, the binary codec used on disk, and the
//! windowed memory that enforces per-conversation capacity.

pub mod codec;
pub mod error;
pub mod model;
pub mod repository;
pub mod window;

/// Binary codec for conversation files.
pub use codec::MessageCodec;
/// Memory error type.
pub use error::MemoryError;
/// Message models.
pub use model::{ChatMessage, MessageRecord, Role};
/// Repository contract and implementations.
pub use repository::{FileMemoryRepository, InMemoryRepository, MemoryRepository};
/// Windowed conversation memory.
pub use window::{DEFAULT_MAX_MESSAGES, WindowedChatMemory};
