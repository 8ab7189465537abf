//! Webhook listener.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use brass_core::{
    BoxedWebhookHandler, ListenerHandle, TransportError, TransportResult, WebhookRequest,
    WebhookStatus,
};
use tracing::{debug, error, info, trace, warn};

/// Serves `POST {path}` for one webhook handler, plus `GET /health`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookServer;

impl WebhookServer {
    /// Creates a new webhook server.
    pub fn new() -> Self {
        Self
    }

    /// Builds the router without binding it.
    pub fn router(&self, path: &str, handler: BoxedWebhookHandler) -> Router {
        let state = Arc::new(ServerState { handler });
        Router::new()
            .route(&normalize_path(path), post(webhook))
            .route("/health", get(health))
            .with_state(state)
    }

    /// Binds `addr` and serves in a background task until the returned
    /// handle is stopped or dropped.
    pub async fn listen(
        &self,
        addr: &str,
        path: &str,
        handler: BoxedWebhookHandler,
    ) -> TransportResult<ListenerHandle> {
        let path = normalize_path(path);
        let router = self.router(&path, handler);

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                reason: e.to_string(),
            }
        })?;
        let local_addr = listener.local_addr()?;

        info!(addr = %local_addr, path = %path, "Webhook server listening");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("Webhook server shutting down");
            });

            if let Err(e) = server.await {
                error!(error = %e, "Webhook server error");
            }
        });

        Ok(ListenerHandle::new(
            format!("webhook-{local_addr}"),
            local_addr.to_string(),
            shutdown_tx,
        ))
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

struct ServerState {
    handler: BoxedWebhookHandler,
}

async fn webhook(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    trace!(remote_addr = %addr, len = body.len(), "Received webhook POST");

    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let request = WebhookRequest {
        headers,
        body: body.to_vec(),
        remote_addr: Some(addr.to_string()),
    };

    let status = state.handler.on_webhook(request).await;
    match status {
        WebhookStatus::Accepted => debug!(remote_addr = %addr, "Webhook accepted"),
        WebhookStatus::Unauthorized => warn!(remote_addr = %addr, "Webhook rejected: bad signature"),
        WebhookStatus::BadRequest => warn!(remote_addr = %addr, "Webhook rejected: bad request"),
    }

    let code = StatusCode::from_u16(status.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match status {
        WebhookStatus::Accepted => "ok",
        WebhookStatus::Unauthorized => "invalid signature",
        WebhookStatus::BadRequest => "bad request",
    };
    (code, body)
}

async fn health() -> &'static str {
    "ok"
}
