//! Request/response interceptors and the chain that runs them.

mod aggregate;
mod chain;
mod content_filter;
mod logging;
mod memory;

use crate::error::ChatError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;

pub use aggregate::aggregate_fragments;
pub use chain::InterceptorChain;
pub use content_filter::{ContentFilterInterceptor, DEFAULT_CONTENT_FILTER_ORDER};
pub use logging::{
    DEFAULT_LOGGING_ORDER, DEFAULT_MAX_RESPONSE_CHARS, LogCrateSink, LogEntry, LogSink, LogTag,
    LoggingInterceptor, NO_USER_MESSAGE, TRUNCATION_MARKER, truncate_for_log,
};
pub use memory::{DEFAULT_MEMORY_ORDER, MemoryInterceptor};

/// A unit that observes or transforms a request and its eventual response.
///
/// Interceptors run in ascending [`order`](Interceptor::order) on the way to
/// the model and in descending order on the way back, so an earlier
/// interceptor's `before` and `after` wrap every later interceptor.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Display name used in logs and errors.
    fn name(&self) -> &str;

    /// Position in the chain. Lower runs first.
    fn order(&self) -> i32;

    /// Inspect or rewrite the request before it moves down the chain.
    async fn before(&self, request: ChatRequest) -> Result<ChatRequest, ChatError> {
        Ok(request)
    }

    /// Inspect or rewrite the complete response on its way back.
    ///
    /// `request` is the request this interceptor forwarded from `before`.
    async fn after(
        &self,
        request: &ChatRequest,
        response: ChatResponse,
    ) -> Result<ChatResponse, ChatError> {
        let _ = request;
        Ok(response)
    }
}
