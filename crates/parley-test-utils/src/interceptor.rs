use async_trait::async_trait;
use parking_lot::Mutex;
use parley_core::{ChatError, ChatRequest, ChatResponse, Interceptor, LogEntry, LogSink, LogTag};
use std::sync::Arc;

/// Log sink keeping entries for assertions.
#[derive(Debug, Default)]
pub struct RecordingLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn texts(&self, tag: LogTag) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.tag == tag)
            .map(|entry| entry.text.clone())
            .collect()
    }
}

impl LogSink for RecordingLogSink {
    fn record(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }
}

/// Interceptor appending `before:{name}` and `after:{name}` to a shared trace.
pub struct RecordingInterceptor {
    name: String,
    order: i32,
    trace: Arc<Mutex<Vec<String>>>,
}

impl RecordingInterceptor {
    pub fn new(name: impl Into<String>, order: i32, trace: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.into(),
            order,
            trace,
        }
    }
}

#[async_trait]
impl Interceptor for RecordingInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn before(&self, request: ChatRequest) -> Result<ChatRequest, ChatError> {
        self.trace.lock().push(format!("before:{}", self.name));
        Ok(request)
    }

    async fn after(
        &self,
        _request: &ChatRequest,
        response: ChatResponse,
    ) -> Result<ChatResponse, ChatError> {
        self.trace.lock().push(format!("after:{}", self.name));
        Ok(response)
    }
}
