//! Event dispatcher.
//!
//! The [`Dispatcher`] owns the ordered command table and the session store.
//! For each text event it:
//!
//! 1. creates one [`BotContext`] (deriving the session key once),
//! 2. tests commands in registration order,
//! 3. runs every matching command until a blocking one has run,
//! 4. applies its [`FailurePolicy`] to the first handler failure.
//!
//! Non-text events are accepted and ignored.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(SessionStore::new())
//!     .failure_policy(FailurePolicy::LogAndContinue)
//!     .with(Command::exact("help", ["help"]).handler(help))
//!     .with(Command::prefix("todo", ["待辦"]).usage(TODO_USAGE).handler(add_todo));
//! ```

use std::sync::Arc;

use brass_core::{BoxedBot, InboundEvent};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tracing::{Instrument, debug, error, info_span, trace};

use crate::command::Command;
use crate::context::BotContext;
use crate::error::{DispatchError, HandlerError};
use crate::session::SessionStore;

/// What the dispatcher does when a handler fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure at error level, record it in the outcome and stop.
    #[default]
    LogAndContinue,
    /// Return the failure to the caller as [`DispatchError::Handler`].
    Propagate,
}

/// A handler failure recorded under [`FailurePolicy::LogAndContinue`].
#[derive(Debug, Clone)]
pub struct CommandFailure {
    pub command: String,
    pub error: HandlerError,
}

/// Result of dispatching one event.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// Names of the commands that matched and ran, in order.
    pub executed: Vec<String>,
    /// Failures recorded under [`FailurePolicy::LogAndContinue`].
    pub failures: Vec<CommandFailure>,
}

impl DispatchOutcome {
    /// Returns `true` if no command matched.
    pub fn is_unmatched(&self) -> bool {
        self.executed.is_empty()
    }

    /// Returns `true` if every command that ran succeeded.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The keyword command dispatcher.
///
/// Cloning is cheap: the command table is shared and the session store is a
/// shared handle.
#[derive(Clone)]
pub struct Dispatcher {
    commands: Arc<Vec<Command>>,
    sessions: SessionStore,
    policy: FailurePolicy,
}

impl Dispatcher {
    /// Creates a dispatcher with no commands over `sessions`.
    pub fn new(sessions: SessionStore) -> Self {
        Self {
            commands: Arc::new(Vec::new()),
            sessions,
            policy: FailurePolicy::default(),
        }
    }

    /// Appends a command. Commands are tested in the order they are added.
    pub fn add(&mut self, command: Command) {
        Arc::make_mut(&mut self.commands).push(command);
    }

    /// Appends a command (builder form).
    pub fn with(mut self, command: Command) -> Self {
        self.add(command);
        self
    }

    /// Sets the failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Dispatches one event.
    ///
    /// Returns the commands that ran. Under [`FailurePolicy::Propagate`] the
    /// first handler failure is returned as an error instead.
    pub async fn dispatch(
        &self,
        event: InboundEvent,
        bot: BoxedBot,
    ) -> Result<DispatchOutcome, DispatchError> {
        let span = info_span!(
            "dispatch",
            event_id = %event.id,
            kind = event.kind_name(),
            platform = event.platform,
        );
        self.dispatch_inner(event, bot).instrument(span).await
    }

    async fn dispatch_inner(
        &self,
        event: InboundEvent,
        bot: BoxedBot,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut outcome = DispatchOutcome::default();

        if event.text().is_none() {
            trace!("Not a text message, skipping dispatch");
            return Ok(outcome);
        }

        let ctx = Arc::new(BotContext::new(event, bot, self.sessions.clone()));
        let session = ctx.session_key().to_string();

        for command in self.commands.iter() {
            match command.clone().oneshot(Arc::clone(&ctx)).await {
                Ok(response) if !response.matched => continue,
                Ok(response) => {
                    debug!(command = command.name(), %session, "Command handled");
                    outcome.executed.push(command.name().to_string());
                    if response.blocking {
                        break;
                    }
                }
                Err(err) => {
                    outcome.executed.push(command.name().to_string());
                    match self.policy {
                        FailurePolicy::Propagate => {
                            return Err(DispatchError::Handler {
                                command: command.name().to_string(),
                                source: err,
                            });
                        }
                        FailurePolicy::LogAndContinue => {
                            error!(command = command.name(), %session, error = %err, "Command failed");
                            outcome.failures.push(CommandFailure {
                                command: command.name().to_string(),
                                error: err,
                            });
                            break;
                        }
                    }
                }
            }
        }

        if outcome.is_unmatched() {
            debug!(%session, "No command matched");
        }

        Ok(outcome)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "commands",
                &self.commands.iter().map(Command::name).collect::<Vec<_>>(),
            )
            .field("policy", &self.policy)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
