//! # Brass
//!
//! A chat-bot framework for the LINE Messaging API built around keyword
//! commands and per-conversation sessions.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌─────────────┐     ┌────────────┐     ┌──────────────────┐
//! │ WebhookServer │────▶│ LineAdapter │────▶│ Dispatcher │────▶│ Command "help"   │──▶ Bot::reply
//! │  (transport)  │     │ (signature, │     │ (in order, │────▶│ Command "todo"   │──▶ Bot::reply
//! └───────────────┘     │   parsing)  │     │  blocking) │────▶│ Command ...      │
//!                       └─────────────┘     └────────────┘     └──────────────────┘
//! ```
//!
//! - **Runtime**: configuration, logging, webhook listener and shutdown
//! - **Adapter**: verifies `X-Line-Signature` and maps payloads to events
//! - **Dispatcher**: walks commands in registration order; the first
//!   matching blocking command stops the walk
//! - **Commands**: a trigger (exact, prefix or contains), an optional usage
//!   hint and an axum-style async handler
//! - **Sessions**: attribute bags keyed by conversation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brass::prelude::*;
//!
//! async fn add_todo(content: Content, session: SessionRef) -> String {
//!     session.update(|attrs| attrs.set("last_todo", content.as_str()));
//!     format!("已新增待辦：{}", content.as_str())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = BrassRuntime::builder().build()?;
//!     runtime.register_command(
//!         Command::prefix("todo", ["待辦"])
//!             .usage("用法：待辦：<內容>")
//!             .handler(add_todo),
//!     );
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `brass.toml` configuration files
//! - `yaml-config`: `brass.yaml` configuration files
//! - `json-log`: JSON log lines

pub use brass_adapter_line as line;
pub use brass_core as core;
pub use brass_framework as framework;
pub use brass_runtime as runtime;
pub use brass_transport as transport;

/// Commonly used types for writing a bot.
///
/// ```rust,ignore
/// use brass::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use brass_runtime::{BrassConfig, BrassRuntime, RuntimeError, RuntimeResult};

    // Commands and dispatch
    pub use brass_framework::{
        BotContext, Command, DispatchOutcome, Dispatcher, FailurePolicy, Trigger,
    };

    // Extractors - for handler parameters
    pub use brass_framework::{
        BotRef, Content, EventRef, FromContext, SessionRef, Sessions, Text,
    };

    // Handler results and sessions
    pub use brass_framework::{
        Attributes, HandlerError, HandlerResult, Session, SessionStore,
    };

    // Platform-neutral model
    pub use brass_core::{Bot, BoxedBot, EventKind, InboundEvent, SessionKey, Source};

    // LINE
    pub use brass_adapter_line::{LineBot, LineConfig};
}
