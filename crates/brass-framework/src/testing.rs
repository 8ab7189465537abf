//! Shared test fixtures.

use std::sync::Arc;

use async_trait::async_trait;
use brass_core::{ApiError, ApiResult, Bot, InboundEvent, SessionKey, Source};
use parking_lot::Mutex;

use crate::context::BotContext;
use crate::session::SessionStore;

/// Records every outgoing text. Optionally fails every call.
#[derive(Default)]
pub(crate) struct RecordingBot {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingBot {
    pub(crate) fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    fn record(&self, texts: &[String]) -> ApiResult<()> {
        if self.fail {
            return Err(ApiError::Rejected {
                status: 400,
                message: "Invalid reply token".into(),
            });
        }
        self.sent.lock().extend(texts.iter().cloned());
        Ok(())
    }
}

#[async_trait]
impl Bot for RecordingBot {
    fn id(&self) -> &str {
        "recording"
    }

    async fn reply(&self, _reply_token: &str, texts: &[String]) -> ApiResult<()> {
        self.record(texts)
    }

    async fn push(&self, _to: &str, texts: &[String]) -> ApiResult<()> {
        self.record(texts)
    }
}

pub(crate) fn user_source(user: &str) -> Source {
    Source::User {
        user_id: user.into(),
    }
}

pub(crate) fn user_key(user: &str) -> SessionKey {
    SessionKey::derive(&user_source(user))
}

pub(crate) fn text_event(text: &str) -> InboundEvent {
    InboundEvent::text_message(user_source("U1"), text)
}

pub(crate) fn context(bot: Arc<RecordingBot>, store: SessionStore, text: &str) -> Arc<BotContext> {
    Arc::new(BotContext::new(text_event(text), bot, store))
}
