//! Webhook seam between transports and adapters.
//!
//! The HTTP listener in `brass-transport` knows nothing about platforms: it
//! hands every request on a registered path to a [`WebhookHandler`] and maps
//! the returned [`WebhookStatus`] onto an HTTP status code.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

/// A raw webhook request.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    /// Request headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Raw request body, exactly as received (signatures are computed over it).
    pub body: Vec<u8>,
    /// Remote address, if known.
    pub remote_addr: Option<String>,
}

impl WebhookRequest {
    /// Creates a request from a body.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// Adds a header (the name is lowercased).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Outcome of handling a webhook request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookStatus {
    /// Accepted; events (if any) are being processed.
    Accepted,
    /// Authentication (signature) failed.
    Unauthorized,
    /// Body could not be parsed.
    BadRequest,
}

impl WebhookStatus {
    /// The HTTP status code for this outcome.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Accepted => 200,
            Self::Unauthorized => 401,
            Self::BadRequest => 400,
        }
    }
}

/// Handles requests arriving on a webhook path.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Processes one request. Must return quickly; long work is spawned.
    async fn on_webhook(&self, request: WebhookRequest) -> WebhookStatus;
}

/// Shared webhook handler.
pub type BoxedWebhookHandler = Arc<dyn WebhookHandler>;

/// Handle to a running listener. Dropping it stops the listener.
#[derive(Debug)]
pub struct ListenerHandle {
    /// Unique identifier for this listener.
    pub id: String,
    /// Address the listener is bound to.
    pub local_addr: String,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl ListenerHandle {
    /// Creates a new listener handle.
    pub fn new(
        id: impl Into<String>,
        local_addr: impl Into<String>,
        shutdown_tx: tokio::sync::oneshot::Sender<()>,
    ) -> Self {
        Self {
            id: id.into(),
            local_addr: local_addr.into(),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Stops the listener.
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = WebhookRequest::new(b"{}".to_vec()).with_header("X-Line-Signature", "abc");
        assert_eq!(req.header("x-line-signature"), Some("abc"));
        assert_eq!(req.header("X-LINE-SIGNATURE"), Some("abc"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(WebhookStatus::Accepted.http_status(), 200);
        assert_eq!(WebhookStatus::Unauthorized.http_status(), 401);
        assert_eq!(WebhookStatus::BadRequest.http_status(), 400);
    }
}
