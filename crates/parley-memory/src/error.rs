//! Error types for memory operations.

/// Errors returned by repositories and the windowed memory.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding a conversation failed.
    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    /// Decoding a conversation failed.
    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    /// Stored file was written by a newer format version.
    #[error("unsupported format version {found} (max supported {supported})")]
    UnsupportedVersion { found: u8, supported: u8 },
    /// Stored file does not start with the expected header.
    #[error("invalid file header")]
    InvalidHeader,
    /// Conversation id cannot be mapped onto a file name.
    #[error("invalid conversation id: {0:?}")]
    InvalidConversationId(String),
    /// Window capacity must be at least one message.
    #[error("invalid window capacity: {0}")]
    InvalidCapacity(usize),
}
