//! HTTP transports.
//!
//! This module provides the webhook listener and the JSON API client.

#[cfg(feature = "http-client")]
mod client;
#[cfg(feature = "http-client")]
pub use client::HttpClient;

#[cfg(feature = "http-server")]
mod server;
#[cfg(feature = "http-server")]
pub use server::WebhookServer;
