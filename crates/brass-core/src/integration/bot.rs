//! Bot trait.
//!
//! A [`Bot`] is the reply capability of one platform account. Handlers use
//! it to answer the event they are processing (by reply token) or to send
//! unsolicited messages (by target id).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::foundation::event::InboundEvent;

/// The reply capability handed to handlers.
///
/// Concrete implementations (e.g. `LineBot`) talk to the platform API.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Returns the bot's identifier (used in logs).
    fn id(&self) -> &str;

    /// Replies to an event using its single-use reply token.
    async fn reply(&self, reply_token: &str, texts: &[String]) -> ApiResult<()>;

    /// Pushes messages to a user, group or room id.
    async fn push(&self, to: &str, texts: &[String]) -> ApiResult<()>;

    /// Answers `event` with `text`.
    ///
    /// Uses the reply token when present and falls back to a push to the
    /// event's conversation otherwise.
    async fn send(&self, event: &InboundEvent, text: &str) -> ApiResult<()> {
        let texts = [text.to_string()];
        match &event.reply_token {
            Some(token) if !token.is_empty() => self.reply(token, &texts).await,
            _ => {
                let target = event.source.push_target();
                if target.is_empty() {
                    return Err(ApiError::NoRoute);
                }
                self.push(target, &texts).await
            }
        }
    }
}

/// Shared bot handle.
pub type BoxedBot = Arc<dyn Bot>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::event::Source;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBot {
        calls: Mutex<Vec<(String, String, Vec<String>)>>,
    }

    #[async_trait]
    impl Bot for RecordingBot {
        fn id(&self) -> &str {
            "recording"
        }

        async fn reply(&self, reply_token: &str, texts: &[String]) -> ApiResult<()> {
            self.calls.lock().unwrap().push((
                "reply".into(),
                reply_token.into(),
                texts.to_vec(),
            ));
            Ok(())
        }

        async fn push(&self, to: &str, texts: &[String]) -> ApiResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(("push".into(), to.into(), texts.to_vec()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_send_prefers_reply_token() {
        let bot = RecordingBot::default();
        let event = InboundEvent::text_message(
            Source::User {
                user_id: "U1".into(),
            },
            "hi",
        );
        bot.send(&event, "hello").await.unwrap();

        let calls = bot.calls.lock().unwrap();
        assert_eq!(calls[0].0, "reply");
        assert_eq!(calls[0].1, "reply-token");
        assert_eq!(calls[0].2, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_send_falls_back_to_push() {
        let bot = RecordingBot::default();
        let mut event = InboundEvent::text_message(
            Source::Group {
                group_id: "G1".into(),
                user_id: None,
            },
            "hi",
        );
        event.reply_token = None;
        bot.send(&event, "hello").await.unwrap();

        let calls = bot.calls.lock().unwrap();
        assert_eq!(calls[0].0, "push");
        assert_eq!(calls[0].1, "G1");
    }
}
