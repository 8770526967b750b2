//! Chat pipeline primitives for parley.
//!
//! This crate owns the request/response types, the model boundary, the
//! interceptor chain with its memory, logging and content-filter
//! interceptors, and the chat client used by the SDK.

pub mod client;
pub mod error;
pub mod interceptor;
pub mod memory;
pub mod model;
pub mod output;
pub mod types;

pub use client::{ChatClient, ChatClientBuilder};
pub use error::ChatError;
/// Interceptor contract, chain and built-in interceptors.
pub use interceptor::{
    ContentFilterInterceptor, Interceptor, InterceptorChain, LogCrateSink, LogEntry, LogSink,
    LogTag, LoggingInterceptor, MemoryInterceptor, aggregate_fragments,
};
pub use memory::{memory_from_config, repository_from_config};
/// Model boundary.
pub use model::{ChatModel, FragmentStream};
pub use output::{JSON_FORMAT_INSTRUCTION, parse_entity};
pub use types::{ChatRequest, ChatResponse, DEFAULT_CONVERSATION_ID};
