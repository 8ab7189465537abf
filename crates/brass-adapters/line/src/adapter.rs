//! LINE webhook adapter.
//!
//! [`LineAdapter`] is the [`WebhookHandler`] mounted on the webhook path. For
//! each request it:
//!
//! 1. verifies `X-Line-Signature` against the raw body (`401` on failure),
//! 2. parses the payload (`400` on malformed JSON),
//! 3. spawns a task that dispatches the events in order, and
//! 4. acknowledges with `200` without waiting for the handlers.
//!
//! Spawned tasks are tracked so the runtime can drain them on shutdown.

use std::sync::Arc;

use async_trait::async_trait;
use brass_core::{BoxedBot, WebhookHandler, WebhookRequest, WebhookStatus};
use brass_framework::Dispatcher;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::model::webhook::WebhookPayload;
use crate::signature::{SIGNATURE_HEADER, verify};

/// The LINE webhook handler.
#[derive(Clone)]
pub struct LineAdapter {
    channel_secret: Arc<str>,
    bot: BoxedBot,
    dispatcher: Dispatcher,
    tasks: TaskTracker,
}

impl LineAdapter {
    /// Creates an adapter that verifies with `channel_secret` and answers
    /// through `bot`.
    pub fn new(channel_secret: impl Into<String>, bot: BoxedBot, dispatcher: Dispatcher) -> Self {
        Self {
            channel_secret: Arc::from(channel_secret.into()),
            bot,
            dispatcher,
            tasks: TaskTracker::new(),
        }
    }

    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Stops accepting new dispatch tasks and waits for running ones.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }
}

#[async_trait]
impl WebhookHandler for LineAdapter {
    async fn on_webhook(&self, request: WebhookRequest) -> WebhookStatus {
        if let Err(e) = verify(
            &self.channel_secret,
            &request.body,
            request.header(SIGNATURE_HEADER),
        ) {
            warn!(error = %e, remote_addr = ?request.remote_addr, "Rejecting webhook");
            return WebhookStatus::Unauthorized;
        }

        let payload = match WebhookPayload::parse(&request.body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Malformed webhook payload");
                return WebhookStatus::BadRequest;
            }
        };

        let destination = payload.destination.clone();
        let events = payload.into_events();
        debug!(%destination, count = events.len(), "Webhook accepted");
        if events.is_empty() {
            return WebhookStatus::Accepted;
        }

        let dispatcher = self.dispatcher.clone();
        let bot = self.bot.clone();
        let span = info_span!("webhook", %destination);
        self.tasks.spawn(
            async move {
                for event in events {
                    let event_id = event.id.clone();
                    if let Err(e) = dispatcher.dispatch(event, bot.clone()).await {
                        error!(%event_id, error = %e, "Dispatch failed");
                    }
                }
            }
            .instrument(span),
        );

        WebhookStatus::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::sign;
    use brass_core::{ApiResult, Bot};
    use brass_framework::{Command, Content, FailurePolicy, SessionStore};
    use std::sync::Mutex;

    const SECRET: &str = "channel-secret";

    #[derive(Default)]
    struct RecordingBot {
        replies: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Bot for RecordingBot {
        fn id(&self) -> &str {
            "recording"
        }

        async fn reply(&self, reply_token: &str, texts: &[String]) -> ApiResult<()> {
            let mut replies = self.replies.lock().unwrap();
            for text in texts {
                replies.push((reply_token.to_string(), text.clone()));
            }
            Ok(())
        }

        async fn push(&self, to: &str, texts: &[String]) -> ApiResult<()> {
            self.reply(to, texts).await
        }
    }

    fn adapter(bot: Arc<RecordingBot>) -> LineAdapter {
        let dispatcher = Dispatcher::new(SessionStore::new())
            .failure_policy(FailurePolicy::Propagate)
            .with(Command::exact("help", ["help"]).handler(|| async { "指令列表" }))
            .with(
                Command::prefix("todo", ["待辦"])
                    .usage("用法：待辦：<內容>")
                    .handler(|c: Content| async move { format!("已新增待辦：{}", c.as_str()) }),
            );
        LineAdapter::new(SECRET, bot, dispatcher)
    }

    fn payload(texts: &[&str]) -> Vec<u8> {
        let events: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                serde_json::json!({
                    "type": "message",
                    "webhookEventId": format!("E{i}"),
                    "timestamp": 1_700_000_000_000i64 + i as i64,
                    "source": {"type": "user", "userId": "U1"},
                    "replyToken": format!("rt-{i}"),
                    "message": {"type": "text", "id": format!("m{i}"), "text": text}
                })
            })
            .collect();
        serde_json::to_vec(&serde_json::json!({"destination": "Ubot", "events": events})).unwrap()
    }

    fn signed(body: Vec<u8>) -> WebhookRequest {
        let sig = sign(SECRET, &body).unwrap();
        WebhookRequest::new(body).with_header("X-Line-Signature", sig)
    }

    #[tokio::test]
    async fn test_signed_payload_is_dispatched_in_order() {
        let bot = Arc::new(RecordingBot::default());
        let adapter = adapter(bot.clone());

        let status = adapter
            .on_webhook(signed(payload(&["help", "待辦：買咖啡", "待辦：", "隨便聊聊"])))
            .await;
        assert_eq!(status, WebhookStatus::Accepted);

        adapter.drain().await;
        let replies = bot.replies.lock().unwrap().clone();
        assert_eq!(
            replies,
            vec![
                ("rt-0".to_string(), "指令列表".to_string()),
                ("rt-1".to_string(), "已新增待辦：買咖啡".to_string()),
                ("rt-2".to_string(), "用法：待辦：<內容>".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_bad_signature_is_rejected() {
        let bot = Arc::new(RecordingBot::default());
        let adapter = adapter(bot.clone());

        let body = payload(&["help"]);
        let forged = WebhookRequest::new(body.clone()).with_header("X-Line-Signature", "Zm9yZ2Vk");
        assert_eq!(adapter.on_webhook(forged).await, WebhookStatus::Unauthorized);

        let unsigned = WebhookRequest::new(body);
        assert_eq!(adapter.on_webhook(unsigned).await, WebhookStatus::Unauthorized);

        adapter.drain().await;
        assert!(bot.replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let adapter = adapter(Arc::new(RecordingBot::default()));
        let status = adapter.on_webhook(signed(b"{not json".to_vec())).await;
        assert_eq!(status, WebhookStatus::BadRequest);
    }

    #[tokio::test]
    async fn test_empty_events_accepted() {
        let adapter = adapter(Arc::new(RecordingBot::default()));
        let status = adapter.on_webhook(signed(payload(&[]))).await;
        assert_eq!(status, WebhookStatus::Accepted);
    }
}
