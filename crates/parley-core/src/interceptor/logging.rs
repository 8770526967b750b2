//! Request/response logging interceptor.

use super::Interceptor;
use crate::error::ChatError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use log::Level;
use parley_config::LoggingConfig;
use std::sync::Arc;

pub const DEFAULT_LOGGING_ORDER: i32 = 20;
pub const DEFAULT_MAX_RESPONSE_CHARS: usize = 10_000;
pub const TRUNCATION_MARKER: &str = "...";
/// Logged when a request carries no user message.
pub const NO_USER_MESSAGE: &str = "<no user message>";

/// Which side of the exchange a log entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Request,
    Response,
}

impl LogTag {
    /// Log target the entry is emitted under.
    pub fn target(self) -> &'static str {
        match self {
            LogTag::Request => "parley::request",
            LogTag::Response => "parley::response",
        }
    }
}

/// A single line produced by [`LoggingInterceptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub tag: LogTag,
    pub text: String,
}

/// Destination for logging interceptor output.
pub trait LogSink: Send + Sync {
    fn record(&self, entry: LogEntry);
}

/// Sink forwarding entries to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn record(&self, entry: LogEntry) {
        log::log!(target: entry.tag.target(), entry.level, "{}", entry.text);
    }
}

/// Logs the first user message of each request and the response text.
pub struct LoggingInterceptor {
    sink: Arc<dyn LogSink>,
    max_response_chars: usize,
    truncation_marker: String,
    order: i32,
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(LogCrateSink),
            max_response_chars: DEFAULT_MAX_RESPONSE_CHARS,
            truncation_marker: TRUNCATION_MARKER.to_string(),
            order: DEFAULT_LOGGING_ORDER,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new()
            .with_max_response_chars(config.max_response_chars)
            .with_truncation_marker(config.truncation_marker.clone())
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_max_response_chars(mut self, max_response_chars: usize) -> Self {
        self.max_response_chars = max_response_chars;
        self
    }

    pub fn with_truncation_marker(mut self, marker: impl Into<String>) -> Self {
        self.truncation_marker = marker.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

#[async_trait]
impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &str {
        "logging"
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn before(&self, request: ChatRequest) -> Result<ChatRequest, ChatError> {
        let text = request
            .first_user_message()
            .map_or(NO_USER_MESSAGE, |message| message.content.as_str())
            .to_string();
        self.sink.record(LogEntry {
            level: Level::Info,
            tag: LogTag::Request,
            text,
        });
        Ok(request)
    }

    async fn after(
        &self,
        _request: &ChatRequest,
        response: ChatResponse,
    ) -> Result<ChatResponse, ChatError> {
        self.sink.record(LogEntry {
            level: Level::Info,
            tag: LogTag::Response,
            text: truncate_for_log(
                &response.content,
                self.max_response_chars,
                &self.truncation_marker,
            ),
        });
        Ok(response)
    }
}

/// Keep the first `max_chars` characters of `text`, appending `marker` if cut.
pub fn truncate_for_log(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{marker}", &text[..cut]),
        None => text.to_string(),
    }
}
