//! Foundation layer: the inbound event model and session keys.

pub mod event;
pub mod session;

pub use event::{EventKind, InboundEvent, MessageContent, Source};
pub use session::SessionKey;
