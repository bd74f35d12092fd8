//! Gateway that reaches the provider through a running relay server.

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use serde::Deserialize;

use crate::client::{DEFAULT_TIMEOUT, normalize_base_url};
use crate::error::{Error, Result};
use crate::gateway::{Gateway, NO_RESPONSE_PLACEHOLDER};
use crate::types::{ChatRequest, ErrorDetail, ModelDescriptor, Turn};

/// Default address of a locally running relay.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8000/";

/// Client for the relay's `POST /chat` endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: ReqwestClient,
    base_url: String,
}

/// The part of a `/chat` reply the client relies on.
#[derive(Deserialize)]
struct RelayReply {
    #[serde(default)]
    response: Option<String>,
}

impl RelayClient {
    /// Creates a client for the relay at `base_url`.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = ReqwestClient::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self { client, base_url })
    }

    /// The relay's base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Gateway for RelayClient {
    async fn complete(
        &self,
        transcript: &[Turn],
        user_message: &str,
        model: &ModelDescriptor,
    ) -> Result<Turn> {
        let url = format!("{}chat", self.base_url);
        let request = ChatRequest::new(user_message, transcript.to_vec())
            .with_model(model.provider_id.clone());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                Error::gateway_unavailable(
                    format!("Request to relay failed: {}", e),
                    None,
                    Some(Box::new(e)),
                )
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            Error::gateway_unavailable(
                format!("Failed to read relay response: {}", e),
                Some(status.as_u16()),
                Some(Box::new(e)),
            )
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorDetail>(&body)
                .map(|detail| detail.detail)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(Error::gateway_unavailable(
                message,
                Some(status.as_u16()),
                None,
            ));
        }

        match serde_json::from_slice::<RelayReply>(&body) {
            Ok(RelayReply {
                response: Some(reply),
            }) if !reply.trim().is_empty() => Ok(Turn::assistant(reply)),
            Ok(_) => {
                tracing::warn!("relay reply had no response");
                Ok(Turn::assistant(NO_RESPONSE_PLACEHOLDER))
            }
            Err(err) => {
                tracing::warn!(error = %err, "relay reply was malformed");
                Ok(Turn::assistant(NO_RESPONSE_PLACEHOLDER))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = RelayClient::new("http://127.0.0.1:8000", None).unwrap();
        assert_eq!(client.base_url(), DEFAULT_RELAY_URL);
    }

    #[tokio::test]
    async fn unreachable_relay_is_gateway_unavailable() {
        // Port 9 (discard) is reserved and not expected to accept HTTP on loopback.
        let client =
            RelayClient::new("http://127.0.0.1:9/", Some(Duration::from_secs(2))).unwrap();
        let model = ModelDescriptor::new("Test", "test-model", false);
        let err = client.complete(&[], "Hello", &model).await.unwrap_err();
        assert!(err.is_gateway_unavailable());
    }
}
