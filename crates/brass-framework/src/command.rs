//! Commands: a trigger plus a handler.
//!
//! A [`Command`] is the unit the [`Dispatcher`](crate::Dispatcher) iterates
//! over. It owns a [`Trigger`], a single handler, an optional usage hint and a
//! blocking flag (on by default, so the first matching command ends dispatch).
//!
//! Commands are also `tower::Service<Arc<BotContext>>`: calling one on a
//! context that does not match is a cheap no-op returning
//! `CommandResponse { matched: false, .. }`.
//!
//! ```rust,ignore
//! let todo = Command::prefix("todo", ["待辦"])
//!     .usage("用法：待辦：<內容>")
//!     .handler(add_todo);
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tracing::debug;

use crate::context::BotContext;
use crate::error::{ExtractError, HandlerError, HandlerResult};
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::matcher::Trigger;

/// What a command call reports back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResponse {
    /// The trigger matched and the handler ran.
    pub matched: bool,
    /// The command stops dispatch when it matches.
    pub blocking: bool,
}

struct CommandInner {
    name: String,
    trigger: Trigger,
    handler: Option<BoxedHandler>,
    usage: Option<String>,
    block: bool,
}

/// A keyword command.
#[derive(Clone)]
pub struct Command {
    inner: Arc<CommandInner>,
}

impl Command {
    /// Creates a command with an explicit trigger and no handler.
    pub fn new(name: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            inner: Arc::new(CommandInner {
                name: name.into(),
                trigger,
                handler: None,
                usage: None,
                block: true,
            }),
        }
    }

    /// A command matched by exact (trimmed) text.
    pub fn exact<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, Trigger::exact(keywords))
    }

    /// A command matched by `keyword<delimiter>content`.
    pub fn prefix<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, Trigger::prefix(keywords))
    }

    /// A command matched when the text contains a keyword.
    pub fn contains<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, Trigger::contains(keywords))
    }

    fn map_inner(self, f: impl FnOnce(&mut CommandInner)) -> Self {
        let mut inner = Arc::try_unwrap(self.inner).unwrap_or_else(|shared| CommandInner {
            name: shared.name.clone(),
            trigger: shared.trigger.clone(),
            handler: shared.handler.clone(),
            usage: shared.usage.clone(),
            block: shared.block,
        });
        f(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Sets the handler, replacing any previous one.
    pub fn handler<F, T>(self, handler: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        let handler = into_handler(handler);
        self.map_inner(|inner| inner.handler = Some(handler))
    }

    /// Sets the hint sent when the command matches but has no content.
    pub fn usage(self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.map_inner(|inner| inner.usage = Some(hint))
    }

    /// Sets whether a match stops dispatch. Defaults to `true`.
    pub fn block(self, block: bool) -> Self {
        self.map_inner(|inner| inner.block = block)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn trigger(&self) -> &Trigger {
        &self.inner.trigger
    }

    pub fn usage_hint(&self) -> Option<&str> {
        self.inner.usage.as_deref()
    }

    pub fn is_blocking(&self) -> bool {
        self.inner.block
    }

    /// Tests the event text against the trigger. Non-text events never match.
    pub fn matches(&self, ctx: &BotContext) -> bool {
        ctx.text().is_some_and(|text| self.inner.trigger.matches(text))
    }

    /// Runs the handler for a context that matched.
    ///
    /// A missing content with a configured usage hint is answered with the
    /// hint. Panics inside the handler are caught and reported as
    /// [`HandlerError::Panicked`].
    pub async fn execute(&self, ctx: Arc<BotContext>) -> HandlerResult {
        let Some(handler) = &self.inner.handler else {
            debug!(command = %self.inner.name, "Command has no handler");
            return Ok(());
        };

        let outcome = AssertUnwindSafe(handler(Arc::clone(&ctx)))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Err(HandlerError::Extract(ExtractError::EmptyContent))) => {
                match &self.inner.usage {
                    Some(usage) => {
                        debug!(command = %self.inner.name, "Empty content, replying usage hint");
                        ctx.reply(usage).await?;
                        Ok(())
                    }
                    None => Err(HandlerError::Extract(ExtractError::EmptyContent)),
                }
            }
            Ok(result) => result,
            Err(panic) => Err(HandlerError::Panicked(panic_message(panic.as_ref()))),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Service<Arc<BotContext>> for Command {
    type Response = CommandResponse;
    type Error = HandlerError;
    type Future = BoxFuture<'static, Result<CommandResponse, HandlerError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Arc<BotContext>) -> Self::Future {
        let command = self.clone();
        async move {
            let blocking = command.is_blocking();
            if !command.matches(&ctx) {
                return Ok(CommandResponse {
                    matched: false,
                    blocking,
                });
            }
            command.execute(ctx).await?;
            Ok(CommandResponse {
                matched: true,
                blocking,
            })
        }
        .boxed()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.inner.name)
            .field("trigger", &self.inner.trigger)
            .field("usage", &self.inner.usage)
            .field("block", &self.inner.block)
            .field("has_handler", &self.inner.handler.is_some())
            .finish()
    }
}
