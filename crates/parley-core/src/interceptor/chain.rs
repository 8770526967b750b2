//! Ordered interceptor chain around a model invocation.

use super::Interceptor;
use super::aggregate::aggregate_fragments;
use crate::error::ChatError;
use crate::model::{ChatModel, FragmentStream};
use crate::types::{ChatRequest, ChatResponse};
use log::debug;
use std::sync::Arc;

/// Interceptors sorted once by declared order.
///
/// Interceptors sharing an order keep their registration order.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Build a chain, sorting interceptors by ascending order.
    pub fn new(mut interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        // Stable sort: ties stay in registration order.
        interceptors.sort_by_key(|interceptor| interceptor.order());
        for pair in interceptors.windows(2) {
            if pair[0].order() == pair[1].order() {
                debug!(
                    "interceptors share order {} ({} runs before {})",
                    pair[0].order(),
                    pair[0].name(),
                    pair[1].name()
                );
            }
        }
        Self { interceptors }
    }

    /// Interceptors in request-path order.
    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    /// Interceptor names in request-path order.
    pub fn names(&self) -> Vec<String> {
        self.interceptors
            .iter()
            .map(|interceptor| interceptor.name().to_string())
            .collect()
    }

    /// Run a single-shot invocation through the chain.
    pub async fn call(
        &self,
        model: &dyn ChatModel,
        request: ChatRequest,
    ) -> Result<ChatResponse, ChatError> {
        let (request, scopes) = self.run_before(request).await?;
        let response = model.call(&request).await?;
        unwind(&self.interceptors, &scopes, response).await
    }

    /// Run a streaming invocation through the chain.
    ///
    /// Fragments reach the caller unchanged. Once the model's stream is
    /// exhausted, every `after` runs once on the aggregated response.
    ///
    /// The caller already holds the fragments, so responses returned by
    /// `after` are discarded here: in this mode interceptors can observe the
    /// response or fail the stream, but not rewrite it.
    pub async fn stream(
        &self,
        model: &dyn ChatModel,
        request: ChatRequest,
    ) -> Result<FragmentStream, ChatError> {
        let (request, scopes) = self.run_before(request).await?;
        let fragments = model.stream(&request).await?;
        let interceptors = self.interceptors.clone();
        Ok(aggregate_fragments(fragments, move |content| async move {
            debug!(
                "stream complete, unwinding interceptors (chars={})",
                content.chars().count()
            );
            unwind(&interceptors, &scopes, ChatResponse::from(content))
                .await
                .map(|_| ())
        }))
    }

    /// Apply every `before` in order, remembering what each one forwarded.
    async fn run_before(
        &self,
        mut request: ChatRequest,
    ) -> Result<(ChatRequest, Vec<ChatRequest>), ChatError> {
        let mut scopes = Vec::with_capacity(self.interceptors.len());
        for interceptor in &self.interceptors {
            request = interceptor.before(request).await?;
            scopes.push(request.clone());
        }
        Ok((request, scopes))
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("interceptors", &self.names())
            .finish()
    }
}

/// Apply every `after` in reverse order.
async fn unwind(
    interceptors: &[Arc<dyn Interceptor>],
    scopes: &[ChatRequest],
    mut response: ChatResponse,
) -> Result<ChatResponse, ChatError> {
    for (interceptor, request) in interceptors.iter().zip(scopes).rev() {
        response = interceptor.after(request, response).await?;
    }
    Ok(response)
}
