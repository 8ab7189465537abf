//! Integration layer: interfaces to the outside world.
//!
//! - [`bot`]: the reply capability used by handlers
//! - [`webhook`]: the seam between an HTTP listener and a platform adapter

pub mod bot;
pub mod webhook;

pub use bot::{Bot, BoxedBot};
pub use webhook::{
    BoxedWebhookHandler, ListenerHandle, WebhookHandler, WebhookRequest, WebhookStatus,
};
