//! # Brass Core
//!
//! The platform-neutral building blocks of the Brass chat-bot framework.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Events**: [`InboundEvent`] with its conversation [`Source`] and [`EventKind`]
//! - **Sessions**: [`SessionKey`], derived deterministically from a [`Source`]
//!
//! ### Integration Layer
//!
//! - **Bot**: the reply capability handed to handlers ([`Bot`], [`BoxedBot`])
//! - **Webhook**: the seam between an HTTP listener and an adapter
//!   ([`WebhookHandler`], [`WebhookRequest`], [`WebhookStatus`])
//!
//! ## Flow
//!
//! ```text
//! ┌───────────┐     ┌──────────┐     ┌────────────┐     ┌─────────┐
//! │ Transport │────▶│ Adapter  │────▶│ Dispatcher │────▶│ Command │──▶ Bot::reply
//! │ (webhook) │     │ (LINE)   │     │            │     │         │
//! └───────────┘     └──────────┘     └────────────┘     └─────────┘
//! ```

pub mod error;
pub mod foundation;
pub mod integration;

pub use error::{
    AdapterError, AdapterResult, ApiError, ApiResult, TransportError, TransportResult,
};
pub use foundation::{EventKind, InboundEvent, MessageContent, SessionKey, Source};
pub use integration::{
    Bot, BoxedBot, BoxedWebhookHandler, ListenerHandle, WebhookHandler, WebhookRequest,
    WebhookStatus,
};
