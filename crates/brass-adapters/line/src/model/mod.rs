//! LINE Messaging API data model.
//!
//! - [`webhook`]: inbound webhook payloads and their conversion to
//!   [`InboundEvent`](brass_core::InboundEvent)
//! - [`api`]: outbound reply/push request bodies

pub mod api;
pub mod webhook;
