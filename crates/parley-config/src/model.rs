//! Configuration schema for parley.

use serde::{Deserialize, Serialize};

/// Root config for parley.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ParleyConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl ParleyConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ParleyConfigBuilder {
        ParleyConfigBuilder::new()
    }
}

/// Builder for assembling a `ParleyConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ParleyConfigBuilder {
    config: ParleyConfig,
}

impl ParleyConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ParleyConfig::default(),
        }
    }

    /// Replace the conversation memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the logging interceptor configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Replace the chat client configuration.
    pub fn chat(mut self, chat: ChatConfig) -> Self {
        self.config.chat = chat;
        self
    }

    /// Finalize and return the built `ParleyConfig`.
    pub fn build(self) -> ParleyConfig {
        self.config
    }
}

/// Repository backend used for conversation memory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemoryBackend {
    /// Process memory only.
    #[default]
    Transient,
    /// One file per conversation under `memory.path`.
    File,
}

/// Conversation memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryConfig {
    #[serde(default)]
    pub backend: MemoryBackend,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: MemoryBackend::default(),
            capacity: default_capacity(),
            path: None,
        }
    }
}

impl MemoryConfig {
    /// Directory for the file backend, falling back to `./tmp/chat_memory`.
    pub fn resolved_path(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| DEFAULT_MEMORY_PATH.to_string())
    }
}

/// Default directory for file-backed memory, relative to the working directory.
pub const DEFAULT_MEMORY_PATH: &str = "tmp/chat_memory";

/// Default number of messages retained per conversation.
fn default_capacity() -> usize {
    10
}

/// Logging interceptor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_max_response_chars")]
    pub max_response_chars: usize,
    #[serde(default = "default_truncation_marker")]
    pub truncation_marker: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_response_chars: default_max_response_chars(),
            truncation_marker: default_truncation_marker(),
        }
    }
}

fn default_max_response_chars() -> usize {
    10_000
}

fn default_truncation_marker() -> String {
    "...".to_string()
}

/// Chat client defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    #[serde(default)]
    pub default_system: Option<String>,
    #[serde(default = "default_conversation_id")]
    pub default_conversation_id: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_system: None,
            default_conversation_id: default_conversation_id(),
        }
    }
}

fn default_conversation_id() -> String {
    "default".to_string()
}
