//! Per-event context handed to handlers.
//!
//! One [`BotContext`] is created for each dispatched event and shared (as
//! `Arc<BotContext>`) by every command that runs for it. It carries the event,
//! the reply capability and the session store, and derives the session key
//! once up front.

use brass_core::{ApiResult, BoxedBot, InboundEvent, SessionKey};

use crate::session::{Session, SessionStore};

/// The context object passed to handlers during event processing.
pub struct BotContext {
    event: InboundEvent,
    bot: BoxedBot,
    sessions: SessionStore,
    session_key: SessionKey,
}

impl BotContext {
    /// Creates a context for `event`.
    pub fn new(event: InboundEvent, bot: BoxedBot, sessions: SessionStore) -> Self {
        let session_key = SessionKey::for_event(&event);
        Self {
            event,
            bot,
            sessions,
            session_key,
        }
    }

    /// Returns the event being processed.
    pub fn event(&self) -> &InboundEvent {
        &self.event
    }

    /// Returns the message text, if the event is a text message.
    pub fn text(&self) -> Option<&str> {
        self.event.text()
    }

    /// Returns a reference to the bot.
    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// Returns a clone of the bot `Arc`.
    pub fn bot_arc(&self) -> BoxedBot {
        self.bot.clone()
    }

    /// Returns the session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns the session key of the event's sender and conversation.
    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }

    /// Returns the caller's session, creating it on first access.
    pub fn session(&self) -> Session {
        self.sessions.get(&self.session_key)
    }

    /// Answers the event with `text`.
    pub async fn reply(&self, text: &str) -> ApiResult<()> {
        self.bot.send(&self.event, text).await
    }
}

impl std::fmt::Debug for BotContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotContext")
            .field("event", &self.event)
            .field("bot", &self.bot.id())
            .field("session_key", &self.session_key)
            .finish_non_exhaustive()
    }
}
