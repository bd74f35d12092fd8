//! Producing the next assistant turn for a conversation.
//!
//! A [`Gateway`] takes the transcript so far, the new user message, and the model to
//! answer with, and returns the assistant's reply as a [`Turn`].  It never appends to a
//! transcript; that is the caller's job, so a failed call leaves no orphaned user turn.

use crate::client::CompletionProvider;
use crate::error::Result;
use crate::observability::{GATEWAY_COMPLETIONS, GATEWAY_FAILURES, GATEWAY_PLACEHOLDERS};
use crate::types::{CompletionRequest, ModelDescriptor, Turn};

/// Sampling temperature sent with every completion request.
pub const SAMPLING_TEMPERATURE: f32 = 0.7;

/// Reply used when the provider answers without usable content.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response";

/// Produces assistant turns.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Produce the assistant's reply to `user_message` given `transcript`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayUnavailable` when no reply could be obtained.
    async fn complete(
        &self,
        transcript: &[Turn],
        user_message: &str,
        model: &ModelDescriptor,
    ) -> Result<Turn>;
}

#[async_trait::async_trait]
impl<G: Gateway + ?Sized> Gateway for Box<G> {
    async fn complete(
        &self,
        transcript: &[Turn],
        user_message: &str,
        model: &ModelDescriptor,
    ) -> Result<Turn> {
        (**self).complete(transcript, user_message, model).await
    }
}

#[async_trait::async_trait]
impl<G: Gateway + ?Sized> Gateway for std::sync::Arc<G> {
    async fn complete(
        &self,
        transcript: &[Turn],
        user_message: &str,
        model: &ModelDescriptor,
    ) -> Result<Turn> {
        (**self).complete(transcript, user_message, model).await
    }
}

/// Gateway that calls a completion provider directly.
#[derive(Debug, Clone)]
pub struct CompletionGateway<P: CompletionProvider> {
    provider: P,
}

impl<P: CompletionProvider> CompletionGateway<P> {
    /// Creates a gateway over `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The provider this gateway delegates to.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait::async_trait]
impl<P: CompletionProvider> Gateway for CompletionGateway<P> {
    async fn complete(
        &self,
        transcript: &[Turn],
        user_message: &str,
        model: &ModelDescriptor,
    ) -> Result<Turn> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.extend_from_slice(transcript);
        messages.push(Turn::user(user_message));
        let request =
            CompletionRequest::new(model.provider_id.clone(), messages, SAMPLING_TEMPERATURE);

        let reply = match self.provider.create(&request).await {
            Ok(response) => match response.text() {
                Some(text) => text.to_string(),
                None => {
                    GATEWAY_PLACEHOLDERS.click();
                    tracing::warn!(model = %model.provider_id, "provider reply had no content");
                    NO_RESPONSE_PLACEHOLDER.to_string()
                }
            },
            Err(err) if err.is_malformed_provider_response() => {
                GATEWAY_PLACEHOLDERS.click();
                tracing::warn!(model = %model.provider_id, error = %err, "provider reply was malformed");
                NO_RESPONSE_PLACEHOLDER.to_string()
            }
            Err(err) => {
                GATEWAY_FAILURES.click();
                tracing::error!(model = %model.provider_id, error = %err, "API request failed");
                return Err(err);
            }
        };

        GATEWAY_COMPLETIONS.click();
        tracing::info!(
            model = %model.provider_id,
            user = %user_message,
            bot = %reply,
            "exchange completed"
        );
        Ok(Turn::assistant(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{CompletionResponse, ModelRegistry, Role};
    use std::sync::Mutex;

    struct FakeProvider {
        reply: Result<CompletionResponse>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeProvider {
        fn replying(reply: Result<CompletionResponse>) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for FakeProvider {
        async fn create(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn llama() -> ModelDescriptor {
        ModelRegistry::new().models()[0].clone()
    }

    fn history() -> Vec<Turn> {
        vec![Turn::user("Hello"), Turn::assistant("Hi! How can I help?")]
    }

    #[tokio::test]
    async fn successful_reply_becomes_assistant_turn() {
        let gateway =
            CompletionGateway::new(FakeProvider::replying(Ok(CompletionResponse::with_text("hi"))));
        let transcript = history();

        let turn = gateway
            .complete(&transcript, "Say hi", &llama())
            .await
            .unwrap();
        assert_eq!(turn, Turn::assistant("hi"));
        assert_eq!(turn.role(), Role::Assistant);
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test]
    async fn request_carries_history_model_and_temperature() {
        let gateway =
            CompletionGateway::new(FakeProvider::replying(Ok(CompletionResponse::with_text("ok"))));
        gateway
            .complete(&history(), "Next", &llama())
            .await
            .unwrap();

        let requests = gateway.provider().requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "llama-3.1-8b-instant");
        assert_eq!(request.temperature, SAMPLING_TEMPERATURE);
        assert_eq!(
            request.messages,
            vec![
                Turn::user("Hello"),
                Turn::assistant("Hi! How can I help?"),
                Turn::user("Next"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_reply_degrades_to_placeholder() {
        let gateway =
            CompletionGateway::new(FakeProvider::replying(Ok(CompletionResponse::default())));
        let turn = gateway.complete(&[], "Hello", &llama()).await.unwrap();
        assert_eq!(turn, Turn::assistant(NO_RESPONSE_PLACEHOLDER));
    }

    #[tokio::test]
    async fn malformed_reply_degrades_to_placeholder() {
        let gateway = CompletionGateway::new(FakeProvider::replying(Err(
            Error::malformed_provider_response("expected value at line 1", None),
        )));
        let turn = gateway.complete(&[], "Hello", &llama()).await.unwrap();
        assert_eq!(turn.content(), NO_RESPONSE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn provider_failure_is_gateway_unavailable() {
        let gateway = CompletionGateway::new(FakeProvider::replying(Err(
            Error::gateway_unavailable("internal error", Some(500), None),
        )));
        let err = gateway.complete(&history(), "Hello", &llama()).await.unwrap_err();
        assert!(err.is_gateway_unavailable());
        assert_eq!(err.status_code(), Some(500));
    }
}
