//! Logging hook for provider traffic.
//!
//! This module provides the [`ClientLogger`] trait that lets callers capture every
//! request the [`ProviderClient`](crate::ProviderClient) sends and every response it
//! decodes.  [`TracingClientLogger`] forwards both to `tracing`.

use crate::types::{CompletionRequest, CompletionResponse};

/// A trait for logging provider client operations.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Mutex;
/// use thinkrelay::{ClientLogger, CompletionRequest, CompletionResponse};
///
/// #[derive(Default)]
/// struct Recorder {
///     models: Mutex<Vec<String>>,
/// }
///
/// impl ClientLogger for Recorder {
///     fn log_request(&self, request: &CompletionRequest) {
///         self.models.lock().unwrap().push(request.model.clone());
///     }
///
///     fn log_response(&self, _: &CompletionResponse) {}
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &CompletionRequest);

    /// Log a successfully decoded response.
    fn log_response(&self, response: &CompletionResponse);
}

/// Forwards provider traffic to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingClientLogger;

impl ClientLogger for TracingClientLogger {
    fn log_request(&self, request: &CompletionRequest) {
        match serde_json::to_string(request) {
            Ok(body) => tracing::debug!(model = %request.model, %body, "provider request"),
            Err(err) => tracing::debug!(model = %request.model, %err, "provider request"),
        }
    }

    fn log_response(&self, response: &CompletionResponse) {
        match serde_json::to_string(response) {
            Ok(body) => tracing::debug!(%body, "provider response"),
            Err(err) => tracing::debug!(%err, "provider response"),
        }
    }
}
