use async_trait::async_trait;
use futures_util::stream;
use parking_lot::Mutex;
use parley_core::{ChatError, ChatModel, ChatRequest, ChatResponse, FragmentStream};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FixedModel {
    response: String,
}

impl FixedModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl ChatModel for FixedModel {
    async fn call(&self, _request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        Ok(ChatResponse::new(self.response.clone()))
    }
}

/// Yields scripted fragments; an `Err` entry becomes a mid-stream failure.
#[derive(Debug, Clone)]
pub struct StreamingModel {
    fragments: Vec<Result<String, String>>,
}

impl StreamingModel {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(|f| Ok(f.into())).collect(),
        }
    }

    pub fn failing_after<I, S>(fragments: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut model = Self::new(fragments);
        model.fragments.push(Err(message.into()));
        model
    }
}

#[async_trait]
impl ChatModel for StreamingModel {
    async fn call(&self, _request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let mut content = String::new();
        for fragment in &self.fragments {
            match fragment {
                Ok(text) => content.push_str(text),
                Err(message) => return Err(ChatError::Model(message.clone())),
            }
        }
        Ok(ChatResponse::new(content))
    }

    async fn stream(&self, _request: &ChatRequest) -> Result<FragmentStream, ChatError> {
        let items = self
            .fragments
            .iter()
            .cloned()
            .map(|fragment| fragment.map_err(ChatError::Model))
            .collect::<Vec<_>>();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Fixed reply that keeps every request it receives.
#[derive(Debug, Clone)]
pub struct RecordingModel {
    response: String,
    pub requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl RecordingModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl ChatModel for RecordingModel {
    async fn call(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.requests.lock().push(request.clone());
        Ok(ChatResponse::new(self.response.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct FailingModel {
    message: String,
}

impl FailingModel {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ChatModel for FailingModel {
    async fn call(&self, _request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        Err(ChatError::Model(self.message.clone()))
    }

    async fn stream(&self, _request: &ChatRequest) -> Result<FragmentStream, ChatError> {
        Err(ChatError::Model(self.message.clone()))
    }
}
