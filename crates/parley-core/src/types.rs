//! Request and response types flowing through the interceptor chain.

use parley_memory::{ChatMessage, Role};

/// Conversation used when a request does not name one.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Outgoing chat request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    /// Conversation the request belongs to.
    pub conversation_id: Option<String>,
    /// Caller instructions: system prompts and the new user turn.
    pub messages: Vec<ChatMessage>,
    /// Prior conversation presented to the model as context.
    pub context: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request holding a single user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new().with_user(content)
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_system(self, content: impl Into<String>) -> Self {
        self.with_message(ChatMessage::system(content))
    }

    pub fn with_user(self, content: impl Into<String>) -> Self {
        self.with_message(ChatMessage::user(content))
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Conversation id, falling back to [`DEFAULT_CONVERSATION_ID`].
    pub fn conversation_id(&self) -> &str {
        self.conversation_id
            .as_deref()
            .unwrap_or(DEFAULT_CONVERSATION_ID)
    }

    pub fn has_system(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.role == Role::System)
    }

    pub fn first_user_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .find(|message| message.role == Role::User)
    }

    /// Messages in the order the model sees them: system instructions,
    /// conversation context, then the remaining instructions.
    pub fn prompt_messages(&self) -> Vec<ChatMessage> {
        let (system, rest): (Vec<&ChatMessage>, Vec<&ChatMessage>) = self
            .messages
            .iter()
            .partition(|message| message.role == Role::System);
        system
            .into_iter()
            .chain(self.context.iter())
            .chain(rest)
            .cloned()
            .collect()
    }
}

/// Final model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatResponse {
    /// Response text.
    pub content: String,
}

impl ChatResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl From<String> for ChatResponse {
    fn from(content: String) -> Self {
        Self { content }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatRequest, DEFAULT_CONVERSATION_ID};
    use parley_memory::ChatMessage;
    use pretty_assertions::assert_eq;

    #[test]
    fn prompt_messages_put_context_between_system_and_user() {
        let mut request = ChatRequest::user("how do I sleep better?").with_system("You are a doctor");
        request.context = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        assert_eq!(
            request.prompt_messages(),
            vec![
                ChatMessage::system("You are a doctor"),
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
                ChatMessage::user("how do I sleep better?"),
            ]
        );
    }

    #[test]
    fn conversation_id_falls_back_to_default() {
        assert_eq!(ChatRequest::new().conversation_id(), DEFAULT_CONVERSATION_ID);
        assert_eq!(
            ChatRequest::new().with_conversation_id("c1").conversation_id(),
            "c1"
        );
    }
}
