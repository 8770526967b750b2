//! Chat client facade wiring a model, defaults and the interceptor chain.

use crate::error::ChatError;
use crate::interceptor::{
    ContentFilterInterceptor, Interceptor, InterceptorChain, LoggingInterceptor, MemoryInterceptor,
};
use crate::memory::memory_from_config;
use crate::model::{ChatModel, FragmentStream};
use crate::output::{parse_entity, with_format_instruction};
use crate::types::{ChatRequest, ChatResponse, DEFAULT_CONVERSATION_ID};
use log::{debug, info};
use parley_config::ParleyConfig;
use parley_memory::{ChatMessage, WindowedChatMemory};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Entry point for chat calls.
#[derive(Clone)]
pub struct ChatClient {
    model: Arc<dyn ChatModel>,
    chain: InterceptorChain,
    default_system: Option<String>,
    default_conversation_id: String,
    memory: Option<Arc<WindowedChatMemory>>,
}

impl ChatClient {
    pub fn builder(model: Arc<dyn ChatModel>) -> ChatClientBuilder {
        ChatClientBuilder::new(model)
    }

    /// Assemble memory, the three standard interceptors and defaults from config.
    pub fn from_config(
        model: Arc<dyn ChatModel>,
        config: &ParleyConfig,
    ) -> Result<Self, ChatError> {
        config.validate()?;
        let memory = memory_from_config(&config.memory)?;
        let mut builder = Self::builder(model)
            .default_conversation_id(config.chat.default_conversation_id.clone())
            .memory(memory)
            .interceptor(Arc::new(ContentFilterInterceptor::new()))
            .interceptor(Arc::new(LoggingInterceptor::from_config(&config.logging)));
        if let Some(system) = &config.chat.default_system {
            builder = builder.default_system(system.clone());
        }
        Ok(builder.build())
    }

    /// Single-shot call through the interceptor chain.
    pub async fn call(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let request = self.prepare(request);
        self.chain.call(self.model.as_ref(), request).await
    }

    /// Streaming call through the interceptor chain.
    pub async fn stream(&self, request: ChatRequest) -> Result<FragmentStream, ChatError> {
        let request = self.prepare(request);
        self.chain.stream(self.model.as_ref(), request).await
    }

    /// Send one user message in a conversation and return the reply text.
    pub async fn chat(
        &self,
        conversation_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<String, ChatError> {
        let request = ChatRequest::user(message).with_conversation_id(conversation_id);
        Ok(self.call(request).await?.content)
    }

    /// Call through the chain asking for JSON, then parse the reply into `T`.
    ///
    /// Memory records the raw reply text.
    pub async fn entity<T: DeserializeOwned>(
        &self,
        request: ChatRequest,
    ) -> Result<T, ChatError> {
        let request = with_format_instruction(self.prepare(request));
        let response = self.chain.call(self.model.as_ref(), request).await?;
        parse_entity(&response.content)
    }

    /// Memory attached through the builder, if any.
    pub fn memory(&self) -> Option<&Arc<WindowedChatMemory>> {
        self.memory.as_ref()
    }

    pub fn chain(&self) -> &InterceptorChain {
        &self.chain
    }

    fn prepare(&self, mut request: ChatRequest) -> ChatRequest {
        if request.conversation_id.is_none() {
            request.conversation_id = Some(self.default_conversation_id.clone());
        }
        if let Some(system) = self
            .default_system
            .as_ref()
            .filter(|_| !request.has_system())
        {
            request.messages.insert(0, ChatMessage::system(system.clone()));
        }
        debug!(
            "dispatching chat request (conversation_id={}, messages={})",
            request.conversation_id(),
            request.messages.len()
        );
        request
    }
}

/// Builder for [`ChatClient`].
pub struct ChatClientBuilder {
    model: Arc<dyn ChatModel>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    default_system: Option<String>,
    default_conversation_id: String,
    memory: Option<Arc<WindowedChatMemory>>,
}

impl ChatClientBuilder {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            interceptors: Vec::new(),
            default_system: None,
            default_conversation_id: DEFAULT_CONVERSATION_ID.to_string(),
            memory: None,
        }
    }

    /// System prompt added to requests that carry none.
    pub fn default_system(mut self, system: impl Into<String>) -> Self {
        self.default_system = Some(system.into());
        self
    }

    /// Conversation used when a request does not name one.
    pub fn default_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.default_conversation_id = conversation_id.into();
        self
    }

    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Attach conversation memory through a [`MemoryInterceptor`].
    pub fn memory(mut self, memory: Arc<WindowedChatMemory>) -> Self {
        self.interceptors
            .push(Arc::new(MemoryInterceptor::new(memory.clone())));
        self.memory = Some(memory);
        self
    }

    pub fn build(self) -> ChatClient {
        let chain = InterceptorChain::new(self.interceptors);
        info!("chat client ready (interceptors={:?})", chain.names());
        ChatClient {
            model: self.model,
            chain,
            default_system: self.default_system,
            default_conversation_id: self.default_conversation_id,
            memory: self.memory,
        }
    }
}
