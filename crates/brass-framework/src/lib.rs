//! # Brass Framework
//!
//! Keyword command dispatch for chat bots.
//!
//! This layer provides:
//! - [`SessionStore`]: per-user, per-conversation attribute bags
//! - [`Trigger`]: per-command match policy (exact, prefix-before-delimiter, contains)
//! - [`Command`]: a trigger plus an Axum-style handler function
//! - [`Dispatcher`]: ordered, first-match dispatch with an explicit [`FailurePolicy`]
//!
//! ```rust,ignore
//! use brass_framework::{Command, Content, Dispatcher, SessionStore};
//!
//! async fn todo(content: Content) -> String {
//!     format!("已新增待辦：{}", content.as_str())
//! }
//!
//! let dispatcher = Dispatcher::new(SessionStore::new())
//!     .with(Command::exact("help", ["help"]).handler(|| async { "commands: ..." }))
//!     .with(Command::prefix("todo", ["待辦"]).usage("用法：待辦：<內容>").handler(todo));
//!
//! dispatcher.dispatch(event, bot).await?;
//! ```

pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod matcher;
pub mod session;

#[cfg(test)]
mod testing;

pub use command::{Command, CommandResponse};
pub use context::BotContext;
pub use dispatcher::{CommandFailure, DispatchOutcome, Dispatcher, FailurePolicy};
pub use error::{DispatchError, ExtractError, ExtractResult, HandlerError, HandlerResult};
pub use extractor::{BotRef, Content, EventRef, FromContext, SessionRef, Sessions, Text};
pub use handler::{BoxedHandler, Handler, HandlerResponse, into_handler};
pub use matcher::{DELIMITERS, Trigger, extract_content};
pub use session::{Attributes, Session, SessionStore};
