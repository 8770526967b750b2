//! Error types for parley config loading.

use thiserror::Error;

/// Errors returned while loading or validating config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// A config file is not valid JSON5.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The merged value does not match the config model.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A field has the wrong shape or an unknown key was found.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A cross-field invariant does not hold.
    #[error("invalid config: {0}")]
    Invalid(String),
}
