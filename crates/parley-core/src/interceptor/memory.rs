//! Conversation memory interceptor.

use super::Interceptor;
use crate::error::ChatError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use log::debug;
use parley_memory::{ChatMessage, Role, WindowedChatMemory};
use std::sync::Arc;

/// Memory runs outermost so its `after` sees the final response.
pub const DEFAULT_MEMORY_ORDER: i32 = i32::MIN + 1000;

/// Injects the conversation window as context and records each exchange.
pub struct MemoryInterceptor {
    memory: Arc<WindowedChatMemory>,
    order: i32,
}

impl MemoryInterceptor {
    pub fn new(memory: Arc<WindowedChatMemory>) -> Self {
        Self {
            memory,
            order: DEFAULT_MEMORY_ORDER,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn memory(&self) -> &Arc<WindowedChatMemory> {
        &self.memory
    }
}

#[async_trait]
impl Interceptor for MemoryInterceptor {
    fn name(&self) -> &str {
        "memory"
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn before(&self, mut request: ChatRequest) -> Result<ChatRequest, ChatError> {
        let conversation_id = request.conversation_id().to_string();
        let history: Vec<ChatMessage> = self
            .memory
            .get(&conversation_id)
            .iter()
            .map(ChatMessage::from)
            .collect();
        debug!(
            "injecting conversation window (conversation_id={}, messages={})",
            conversation_id,
            history.len()
        );
        if !history.is_empty() {
            let existing = std::mem::take(&mut request.context);
            request.context = history;
            request.context.extend(existing);
        }
        Ok(request)
    }

    async fn after(
        &self,
        request: &ChatRequest,
        response: ChatResponse,
    ) -> Result<ChatResponse, ChatError> {
        let mut exchange: Vec<ChatMessage> = request
            .messages
            .iter()
            .filter(|message| message.role == Role::User)
            .cloned()
            .collect();
        exchange.push(ChatMessage::assistant(response.content.clone()));
        self.memory.add(request.conversation_id(), exchange)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MEMORY_ORDER, MemoryInterceptor};
    use crate::interceptor::Interceptor;
    use crate::types::{ChatRequest, ChatResponse};
    use parley_memory::{ChatMessage, InMemoryRepository, WindowedChatMemory};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn interceptor(capacity: usize) -> MemoryInterceptor {
        let memory = WindowedChatMemory::new(Arc::new(InMemoryRepository::new()), capacity)
            .expect("memory");
        MemoryInterceptor::new(Arc::new(memory))
    }

    #[tokio::test]
    async fn first_turn_has_no_context() {
        let interceptor = interceptor(10);
        assert_eq!(interceptor.order(), DEFAULT_MEMORY_ORDER);
        let request = interceptor
            .before(ChatRequest::user("hi").with_conversation_id("c1"))
            .await
            .expect("before");
        assert!(request.context.is_empty());
    }

    #[tokio::test]
    async fn records_user_and_assistant_then_replays_them() {
        let interceptor = interceptor(10);
        let first = ChatRequest::user("hi")
            .with_system("be brief")
            .with_conversation_id("c1");
        let first = interceptor.before(first).await.expect("before");
        interceptor
            .after(&first, ChatResponse::new("hello"))
            .await
            .expect("after");

        let second = ChatRequest::user("again").with_conversation_id("c1");
        let second = interceptor.before(second).await.expect("before");
        assert_eq!(
            second.context,
            vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")]
        );
        assert_eq!(second.messages, vec![ChatMessage::user("again")]);
    }

    #[tokio::test]
    async fn window_is_prepended_to_existing_context() {
        let interceptor = interceptor(10);
        interceptor
            .memory()
            .add("c1", vec![ChatMessage::user("stored")])
            .expect("seed");

        let mut request = ChatRequest::user("now").with_conversation_id("c1");
        request.context = vec![ChatMessage::assistant("supplied")];
        let request = interceptor.before(request).await.expect("before");
        assert_eq!(
            request.context,
            vec![ChatMessage::user("stored"), ChatMessage::assistant("supplied")]
        );
    }

    #[tokio::test]
    async fn requests_without_id_use_default_conversation() {
        let interceptor = interceptor(10);
        let request = ChatRequest::user("hi");
        interceptor
            .after(&request, ChatResponse::new("hello"))
            .await
            .expect("after");
        assert_eq!(interceptor.memory().get("default").len(), 2);
    }
}
