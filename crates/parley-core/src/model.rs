//! Boundary to the language model that produces responses.

use crate::error::ChatError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use futures_util::stream::{self, Stream};
use std::pin::Pin;

/// Partial response pieces that together form one response.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Terminal model invocation at the end of the interceptor chain.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce a complete response.
    async fn call(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;

    /// Produce a response as a stream of fragments.
    ///
    /// Models without native streaming yield their full response as one fragment.
    async fn stream(&self, request: &ChatRequest) -> Result<FragmentStream, ChatError> {
        let response = self.call(request).await?;
        Ok(Box::pin(stream::once(async move { Ok(response.content) })))
    }
}
