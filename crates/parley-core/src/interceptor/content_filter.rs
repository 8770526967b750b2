//! Pass-through content filter interceptor.

use super::Interceptor;
use crate::error::ChatError;
use crate::types::ChatRequest;
use async_trait::async_trait;
use log::trace;

pub const DEFAULT_CONTENT_FILTER_ORDER: i32 = 0;

/// Placeholder filter with no policy; forwards requests and responses unchanged.
#[derive(Debug, Clone)]
pub struct ContentFilterInterceptor {
    order: i32,
}

impl Default for ContentFilterInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFilterInterceptor {
    pub fn new() -> Self {
        Self {
            order: DEFAULT_CONTENT_FILTER_ORDER,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Hook for request screening. Accepts everything.
    pub fn before_call(&self, request: &ChatRequest) {
        trace!(
            "content filter passed request (conversation_id={}, messages={})",
            request.conversation_id(),
            request.messages.len()
        );
    }
}

#[async_trait]
impl Interceptor for ContentFilterInterceptor {
    fn name(&self) -> &str {
        "content-filter"
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn before(&self, request: ChatRequest) -> Result<ChatRequest, ChatError> {
        self.before_call(&request);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::ContentFilterInterceptor;
    use crate::interceptor::Interceptor;
    use crate::types::{ChatRequest, ChatResponse};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn passes_everything_through() {
        let filter = ContentFilterInterceptor::new();
        let request = ChatRequest::user("anything").with_system("sys");
        let forwarded = filter.before(request.clone()).await.expect("before");
        assert_eq!(forwarded, request);

        let response = filter
            .after(&forwarded, ChatResponse::new("reply"))
            .await
            .expect("after");
        assert_eq!(response, ChatResponse::new("reply"));
        assert_eq!(filter.order(), 0);
    }
}
