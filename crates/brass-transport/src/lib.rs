//! # Brass Transport
//!
//! HTTP plumbing for the Brass chat-bot framework.
//!
//! ## Features
//!
//! - `http-server`: the webhook listener ([`WebhookServer`])
//! - `http-client`: the JSON API client ([`HttpClient`])
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Adapter Layer      │  (LINE, ...)
//! │  (WebhookHandler)   │
//! ├─────────────────────┤
//! │  brass-core         │  (WebhookHandler, ListenerHandle, TransportError)
//! ├─────────────────────┤
//! │  brass-transport    │  <- This crate (axum listener, reqwest client)
//! ├─────────────────────┤
//! │  Network (TCP/HTTP) │
//! └─────────────────────┘
//! ```
//!
//! The listener is platform-agnostic: it passes headers and the raw body to a
//! [`WebhookHandler`](brass_core::WebhookHandler) and turns the returned
//! [`WebhookStatus`](brass_core::WebhookStatus) into an HTTP status.
//!
//! ```rust,ignore
//! use brass_transport::WebhookServer;
//!
//! let handle = WebhookServer::new().listen("0.0.0.0:8080", "/callback", handler).await?;
//! ```

#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

#[cfg(feature = "http-server")]
pub use http::WebhookServer;

#[cfg(feature = "http-client")]
pub use http::HttpClient;
