//! Structured output: ask for JSON and parse the reply into a type.

use crate::error::ChatError;
use crate::types::ChatRequest;
use serde::de::DeserializeOwned;

/// Instruction sent when a typed reply is requested.
pub const JSON_FORMAT_INSTRUCTION: &str = "Your response should be in JSON format.\n\
Do not include any explanations, only provide a RFC8259 compliant JSON response \
without deviation.\n\
Do not include markdown code blocks in your response.";

/// Add [`JSON_FORMAT_INSTRUCTION`] as a trailing system message.
///
/// Memory only records user and assistant turns, so the instruction is never
/// replayed as conversation context.
pub fn with_format_instruction(request: ChatRequest) -> ChatRequest {
    request.with_system(JSON_FORMAT_INSTRUCTION)
}

/// Parse a model reply into `T`, tolerating a fenced block or surrounding prose.
pub fn parse_entity<T: DeserializeOwned>(text: &str) -> Result<T, ChatError> {
    Ok(serde_json::from_str(extract_json(text))?)
}

/// Locate the JSON document inside a reply.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```") {
        let body = &trimmed[start + 3..];
        let body = body.strip_prefix("json").unwrap_or(body);
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::{JSON_FORMAT_INSTRUCTION, parse_entity, with_format_instruction};
    use crate::error::ChatError;
    use crate::types::ChatRequest;
    use parley_memory::ChatMessage;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Report {
        title: String,
        suggestions: Vec<String>,
    }

    fn report() -> Report {
        Report {
            title: "Insomnia".to_string(),
            suggestions: vec!["sleep early".to_string()],
        }
    }

    #[test]
    fn instruction_is_a_trailing_system_message() {
        let request = with_format_instruction(ChatRequest::user("hi").with_system("sys"));
        assert_eq!(
            request.messages,
            vec![
                ChatMessage::user("hi"),
                ChatMessage::system("sys"),
                ChatMessage::system(JSON_FORMAT_INSTRUCTION),
            ]
        );
        assert_eq!(
            request.prompt_messages().last(),
            Some(&ChatMessage::user("hi"))
        );
    }

    #[test]
    fn parses_plain_fenced_and_wrapped_json() {
        let plain = r#"{"title":"Insomnia","suggestions":["sleep early"]}"#;
        assert_eq!(parse_entity::<Report>(plain).expect("plain"), report());

        let fenced = format!("```json\n{plain}\n```");
        assert_eq!(parse_entity::<Report>(&fenced).expect("fenced"), report());

        let wrapped = format!("Here is your report: {plain} Take care.");
        assert_eq!(parse_entity::<Report>(&wrapped).expect("wrapped"), report());
    }

    #[test]
    fn mismatched_reply_is_a_parse_error() {
        let err = parse_entity::<Report>(r#"{"title": 3}"#).unwrap_err();
        assert!(matches!(err, ChatError::Parse(_)));
        assert!(matches!(
            parse_entity::<Report>("no json here"),
            Err(ChatError::Parse(_))
        ));
    }
}
