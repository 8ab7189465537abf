//! # Brass Adapter for the LINE Messaging API
//!
//! This crate connects the Brass framework to LINE:
//!
//! - webhook signature verification (`X-Line-Signature`)
//! - webhook payload parsing into [`InboundEvent`](brass_core::InboundEvent)s
//! - the [`LineBot`] reply/push client
//! - the [`LineAdapter`] webhook handler that feeds the dispatcher
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brass_adapter_line::{LineAdapter, LineBot, LineConfig};
//!
//! let config = LineConfig::new(secret, token);
//! let bot = Arc::new(LineBot::new(&config)?);
//! let adapter = LineAdapter::new(&config.channel_secret, bot, dispatcher);
//! let handle = WebhookServer::new().listen("0.0.0.0:8080", "/callback", Arc::new(adapter)).await?;
//! ```
//!
//! ## Event Mapping
//!
//! ```text
//! LINE event             InboundEvent.kind
//! ─────────────────────  ─────────────────────────────
//! message (text)         Message(Text { id, text })
//! message (other)        Message(Other { id, kind })
//! follow / unfollow      Follow / Unfollow
//! join / leave           Join / Leave
//! postback               Postback { data }
//! anything else          Other(type)
//! ```
//!
//! Events whose `source.type` is not `user`, `group` or `room` are logged
//! and skipped.

mod adapter;
pub mod bot;
pub mod config;
pub mod model;
pub mod signature;

pub use adapter::LineAdapter;
pub use bot::LineBot;
pub use config::LineConfig;
pub use model::webhook::{PLATFORM, WebhookPayload};
