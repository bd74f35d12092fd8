//! The relay's HTTP surface.
//!
//! `POST /chat` takes a message, the history so far, and an optional model, and answers
//! with the reply and the extended history.  `GET /models` lists the models the relay
//! will accept.  The server holds no conversation state; every request carries its own.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::observability::{RELAY_REJECTIONS, RELAY_REQUESTS};
use crate::types::{ChatRequest, ChatResponse, ErrorDetail, ModelDescriptor, ModelRegistry, Turn};

/// Detail returned when the gateway could not produce a reply.
pub const GATEWAY_FAILURE_DETAIL: &str = "Failed to fetch response from LLM";

/// Shared, read-only state for the relay's handlers.
#[derive(Clone)]
pub struct RelayState {
    gateway: Arc<dyn Gateway>,
    registry: Arc<ModelRegistry>,
    default_model: ModelDescriptor,
}

impl RelayState {
    /// Creates relay state.  `default_model` answers requests that name no model.
    pub fn new(
        gateway: Arc<dyn Gateway>,
        registry: ModelRegistry,
        default_model: ModelDescriptor,
    ) -> Self {
        Self {
            gateway,
            registry: Arc::new(registry),
            default_model,
        }
    }

    fn resolve_model(&self, name: Option<&str>) -> Result<&ModelDescriptor> {
        match name {
            None => Ok(&self.default_model),
            Some(name) => self.registry.lookup(name).ok_or_else(|| {
                Error::bad_request(format!("Unknown model: {name}"), Some("model".to_string()))
            }),
        }
    }
}

/// Error half of a handler result: a status code and a `{"detail": ...}` body.
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorDetail::new(self.detail))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::BadRequest { message, .. } | Error::InvalidTurn { message } => ApiError {
                status: StatusCode::BAD_REQUEST,
                detail: message,
            },
            // Provider details stay in the log.
            err => {
                tracing::error!(error = %err, "upstream failure");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: GATEWAY_FAILURE_DETAIL.to_string(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            detail: rejection.body_text(),
        }
    }
}

/// Builds the relay router.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/models", get(models))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the relay on `listener` until the process receives Ctrl-C.
pub async fn serve(listener: TcpListener, state: RelayState) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "relay listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(%err, "failed to listen for shutdown signal");
            }
        })
        .await
        .map_err(|err| Error::io("relay server failed", err))
}

async fn chat(
    State(state): State<RelayState>,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> std::result::Result<Json<ChatResponse>, ApiError> {
    RELAY_REQUESTS.click();
    let result = handle_chat(&state, body).await;
    if let Err(err) = &result {
        RELAY_REJECTIONS.click();
        tracing::warn!(status = %err.status, detail = %err.detail, "chat request failed");
    }
    result.map(Json)
}

async fn handle_chat(
    state: &RelayState,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> std::result::Result<ChatResponse, ApiError> {
    let Json(request) = body?;
    let message = request.validated_message()?;
    let model = state.resolve_model(request.model.as_deref())?;

    let reply = state
        .gateway
        .complete(&request.history, message, model)
        .await?;

    let mut history = request.history.clone();
    history.push(Turn::user(message));
    history.push(reply.clone());
    Ok(ChatResponse {
        response: reply.content().to_string(),
        history,
    })
}

async fn models(State(state): State<RelayState>) -> Json<Vec<ModelDescriptor>> {
    Json(state.registry.models().to_vec())
}
