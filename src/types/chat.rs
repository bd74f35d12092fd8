use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Turn;

/// Body of a `POST /chat` request to the relay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new user message.
    #[serde(default)]
    pub message: Option<String>,

    /// Conversation so far, oldest first.
    #[serde(default)]
    pub history: Vec<Turn>,

    /// Model to answer with; the relay's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    /// Creates a request for `message` on top of `history`.
    pub fn new(message: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            message: Some(message.into()),
            history,
            model: None,
        }
    }

    /// Selects the model to answer with.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Returns the message with surrounding whitespace trimmed, rejecting requests where
    /// it is missing or blank.
    pub fn validated_message(&self) -> Result<&str> {
        let message = self.message.as_deref().map(str::trim).unwrap_or_default();
        if message.is_empty() {
            return Err(Error::bad_request(
                "Missing 'message' in request",
                Some("message".to_string()),
            ));
        }
        for turn in &self.history {
            turn.validate()?;
        }
        Ok(message)
    }
}

/// Body of a successful `POST /chat` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's raw reply.
    pub response: String,

    /// The request history extended with the user turn and the reply.
    pub history: Vec<Turn>,
}

/// Body of a failed `POST /chat` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// What went wrong.
    pub detail: String,
}

impl ErrorDetail {
    /// Creates a new error detail.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_decodes_without_optional_fields() {
        let request: ChatRequest = serde_json::from_value(json!({"message": "Hello"})).unwrap();
        assert_eq!(request.validated_message().unwrap(), "Hello");
        assert!(request.history.is_empty());
        assert!(request.model.is_none());
    }

    #[test]
    fn missing_or_blank_message_is_a_bad_request() {
        let missing: ChatRequest = serde_json::from_value(json!({"history": []})).unwrap();
        let err = missing.validated_message().unwrap_err();
        assert!(err.is_bad_request());
        assert_eq!(
            err.to_string(),
            "Bad request: Missing 'message' in request (parameter: message)"
        );

        let blank = ChatRequest::new("  ", Vec::new());
        assert!(blank.validated_message().unwrap_err().is_bad_request());
    }

    #[test]
    fn message_is_trimmed() {
        let request = ChatRequest::new("  Hello there \n", Vec::new());
        assert_eq!(request.validated_message().unwrap(), "Hello there");
    }

    #[test]
    fn blank_history_turn_is_rejected() {
        let request = ChatRequest::new("Hello", vec![Turn::user("hi"), Turn::assistant("")]);
        assert!(request.validated_message().unwrap_err().is_invalid_turn());
    }

    #[test]
    fn model_is_omitted_when_unset() {
        let value = serde_json::to_value(ChatRequest::new("Hello", Vec::new())).unwrap();
        assert_eq!(value, json!({"message": "Hello", "history": []}));
    }
}
