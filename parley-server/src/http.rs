//! Parley HTTP API
//!
//! Axum server that receives Business Messages webhooks. The webhook is
//! acknowledged as soon as the payload is validated; negotiation and delivery
//! run on a spawned task so the platform never waits on translation or sends.
//!
//! Each endpoint has a thin axum handler that delegates to an inner function,
//! which the tests call directly.
//!
//! Endpoints:
//! - POST {webhook_path} — Business Messages callback (default `/callback`)
//! - GET  /health        — liveness plus session count
//! - GET  /version       — server version info

use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parley_core::models::WebhookPayload;
use parley_core::ParleyConfig;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::subsystems::dispatch::{spawn_dispatch, Dispatcher};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: ParleyConfig,
}

pub fn build_router(state: Arc<HttpState>) -> Router {
    let webhook_path = state.config.http.webhook_path.clone();
    Router::new()
        .route(&webhook_path, post(webhook_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .with_state(state)
}

/// Serve until the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.http.host, state.config.http.port);
    let webhook_path = state.config.http.webhook_path.clone();

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Parley listening on http://{}{}", addr, webhook_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }
}

/// Result of accepting a webhook call.
///
/// `dispatched` is the background task handling the event, if one was started.
pub struct WebhookAck {
    pub status: StatusCode,
    pub error: Option<ErrorResponse>,
    pub dispatched: Option<JoinHandle<()>>,
}

impl WebhookAck {
    fn accepted(dispatched: Option<JoinHandle<()>>) -> Self {
        Self {
            status: StatusCode::OK,
            error: None,
            dispatched,
        }
    }

    fn rejected(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: Some(ErrorResponse::new(msg)),
            dispatched: None,
        }
    }
}

/// Validate a webhook body and hand the event to the dispatcher.
///
/// Malformed JSON or a payload missing its conversation or agent is a 400.
/// Payloads with nothing to act on (receipts, typing signals) are a 200
/// with no dispatch.
pub fn webhook_inner(dispatcher: &Arc<Dispatcher>, body: &[u8]) -> WebhookAck {
    let payload: WebhookPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting malformed webhook body");
            return WebhookAck::rejected(format!("malformed payload: {}", e));
        }
    };

    let envelope = match payload.into_envelope() {
        Ok(Some(envelope)) => envelope,
        Ok(None) => {
            tracing::debug!("Webhook carried no message or suggestion response");
            return WebhookAck::accepted(None);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting invalid webhook payload");
            return WebhookAck::rejected(e.to_string());
        }
    };

    tracing::info!(
        conversation_id = envelope.event.conversation_id(),
        kind = envelope.event.kind(),
        display_name = envelope.display_name.as_deref().unwrap_or(""),
        brand_id = envelope.brand_id.as_deref().unwrap_or(""),
        "Webhook received"
    );

    WebhookAck::accepted(Some(spawn_dispatch(dispatcher.clone(), envelope)))
}

pub async fn health_inner(dispatcher: &Dispatcher) -> (StatusCode, serde_json::Value) {
    let sessions = dispatcher.sessions();
    (
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "sessions": sessions.len(),
            "server_language": sessions.default_language(),
        }),
    )
}

pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "service": "parley",
    })
}

// ============================================================================
// Axum handler wrappers
// ============================================================================

pub async fn webhook_handler(State(state): State<Arc<HttpState>>, body: Bytes) -> Response {
    let ack = webhook_inner(&state.dispatcher, &body);
    match ack.error {
        Some(error) => (ack.status, Json(error)).into_response(),
        None => ack.status.into_response(),
    }
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.dispatcher).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string());
        assert_eq!(v["service"], "parley");
    }

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_value(ErrorResponse::new("bad")).unwrap();
        assert_eq!(body["error"], "bad");
        assert_eq!(body["status"], "error");
    }
}
