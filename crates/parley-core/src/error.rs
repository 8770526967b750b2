//! Error types for the chat pipeline.

use parley_config::ConfigError;
use parley_memory::MemoryError;
use thiserror::Error;

/// Errors returned by the interceptor chain and chat client.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The model invocation failed.
    #[error("model error: {0}")]
    Model(String),
    /// Conversation memory could not be persisted.
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    /// An interceptor rejected the request or response.
    #[error("interceptor {name} failed: {message}")]
    Interceptor { name: String, message: String },
    /// A structured response did not match the requested type.
    #[error("failed to parse structured response: {0}")]
    Parse(#[from] serde_json::Error),
    /// Config could not be applied.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
