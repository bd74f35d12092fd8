use serde::{Deserialize, Serialize};

use crate::types::Turn;

/// Body of a `chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider model identifier.
    pub model: String,

    /// Conversation so far, oldest first, ending with the new user turn.
    pub messages: Vec<Turn>,

    /// Sampling temperature.
    pub temperature: f32,
}

impl CompletionRequest {
    /// Creates a new completion request.
    pub fn new(model: impl Into<String>, messages: Vec<Turn>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
        }
    }
}

/// Body of a successful `chat/completions` response.
///
/// Every level is optional so that a partial body decodes and can be degraded instead of
/// failing the exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Candidate completions; only the first is used.
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    /// The generated message.
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

/// The message inside a completion choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    /// Role reported by the provider, usually "assistant".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Generated text.
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Builds a response holding a single assistant message.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                message: Some(CompletionMessage {
                    role: Some("assistant".to_string()),
                    content: Some(text.into()),
                }),
            }],
        }
    }

    /// Text of the first choice, if it carries any non-blank content.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .filter(|content| !content.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn request_serializes_to_provider_shape() {
        let request = CompletionRequest::new(
            "llama-3.1-8b-instant",
            vec![Turn::user("Hello")],
            0.7,
        );
        let value = to_value(&request).unwrap();
        assert_eq!(value["model"], json!("llama-3.1-8b-instant"));
        assert_eq!(
            value["messages"],
            json!([{"role": "user", "content": "Hello"}])
        );
        let temperature = value["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn text_reads_first_choice() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hi"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        }))
        .unwrap();
        assert_eq!(response.text(), Some("hi"));
    }

    #[test]
    fn partial_bodies_have_no_text() {
        for body in [
            json!({}),
            json!({"choices": []}),
            json!({"choices": [{}]}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": null}}]}),
            json!({"choices": [{"message": {"content": "   "}}]}),
        ] {
            let response: CompletionResponse = serde_json::from_value(body.clone()).unwrap();
            assert_eq!(response.text(), None, "body: {body}");
        }
    }
}
