use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{PROVIDER_REQUEST_DURATION, PROVIDER_REQUEST_ERRORS, PROVIDER_REQUESTS};
use crate::types::{CompletionRequest, CompletionResponse};

/// Base URL of the default provider's OpenAI-compatible API.
pub const DEFAULT_PROVIDER_URL: &str = "https://api.groq.com/openai/v1/";

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "THINKRELAY_API_KEY";

/// Default bound on a single provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Something that can turn a completion request into a completion response.
///
/// [`ProviderClient`] is the HTTP implementation; tests substitute their own.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one completion request.
    ///
    /// # Errors
    ///
    /// `GatewayUnavailable` on transport failures and non-2xx statuses,
    /// `MalformedProviderResponse` when a 2xx body cannot be decoded.
    async fn create(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

/// Client for an OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct ProviderClient {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl ProviderClient {
    /// Create a new provider client.
    ///
    /// The API key can be provided directly or read from the THINKRELAY_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var(API_KEY_ENV).map_err(|_| {
                Error::authentication(format!(
                    "API key not provided and {API_KEY_ENV} environment variable not set"
                ))
            })?,
        };
        if api_key.trim().is_empty() {
            return Err(Error::authentication("API key is empty"));
        }

        let base_url = normalize_base_url(base_url.as_deref().unwrap_or(DEFAULT_PROVIDER_URL))?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attaches a logger that sees every request and decoded response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are sent under.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The bound on each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::gateway_unavailable(
                    format!("Failed to read error response: {}", e),
                    Some(status_code),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let message = match detail {
            Some(ErrorDetail {
                error_type: Some(error_type),
                message: Some(message),
            }) => format!("{error_type}: {message}"),
            Some(ErrorDetail {
                message: Some(message),
                ..
            }) => message,
            _ if error_body.trim().is_empty() => "provider returned an error".to_string(),
            _ => error_body,
        };
        Error::gateway_unavailable(message, Some(status_code), None)
    }

    /// Send a completion request and decode the response.
    pub async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        PROVIDER_REQUESTS.click();
        let start = Instant::now();
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }
        let result = self.send_inner(request).await;
        PROVIDER_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        match &result {
            Ok(response) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(response);
                }
            }
            Err(_) => PROVIDER_REQUEST_ERRORS.click(),
        }
        result
    }

    async fn send_inner(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice::<CompletionResponse>(&body).map_err(|e| {
            Error::malformed_provider_response(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::gateway_unavailable(
                format!(
                    "Request timed out after {} seconds: {}",
                    self.timeout.as_secs_f64(),
                    e
                ),
                None,
                Some(Box::new(e)),
            )
        } else if e.is_connect() {
            Error::gateway_unavailable(format!("Connection error: {}", e), None, Some(Box::new(e)))
        } else {
            Error::gateway_unavailable(format!("Request failed: {}", e), None, Some(Box::new(e)))
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for ProviderClient {
    async fn create(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.send(request).await
    }
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Parses `base_url` and makes sure it ends in a slash so paths can be appended.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String> {
    let parsed = Url::parse(base_url)?;
    if parsed.cannot_be_a_base() {
        return Err(Error::url(format!("{base_url} cannot be a base URL"), None));
    }
    let mut base = parsed.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ProviderClient::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_PROVIDER_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = ProviderClient::with_options(
            Some("test-key".to_string()),
            Some("https://custom-api.example.com/v1".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://custom-api.example.com/v1/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = ProviderClient::new(Some("  ".to_string())).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ProviderClient::with_options(
            Some("test-key".to_string()),
            Some("not a url".to_string()),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn headers_carry_bearer_token() {
        let client = ProviderClient::new(Some("secret".to_string())).unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn debug_redacts_key() {
        let client = ProviderClient::new(Some("secret".to_string())).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }
}
