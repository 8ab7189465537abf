//! Inbound webhook payloads.
//!
//! ```json
//! {
//!   "destination": "Uxxxxxxxx",
//!   "events": [
//!     {
//!       "type": "message",
//!       "webhookEventId": "01H...",
//!       "timestamp": 1700000000000,
//!       "source": { "type": "group", "groupId": "C123", "userId": "U456" },
//!       "replyToken": "b60d...",
//!       "message": { "type": "text", "id": "4680...", "text": "help" }
//!     }
//!   ]
//! }
//! ```
//!
//! Events are kept as raw JSON until conversion so that one event with an
//! unknown shape does not reject the whole payload.

use brass_core::{AdapterError, AdapterResult, EventKind, InboundEvent, MessageContent, Source};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

/// Platform name stamped on converted events.
pub const PLATFORM: &str = "line";

/// The webhook request body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// User id of the bot that should receive the events.
    #[serde(default)]
    pub destination: String,
    /// Raw events, converted one by one.
    #[serde(default)]
    pub events: Vec<Value>,
}

impl WebhookPayload {
    /// Parses a raw request body.
    pub fn parse(body: &[u8]) -> AdapterResult<Self> {
        serde_json::from_slice(body).map_err(|e| AdapterError::parse(e.to_string()))
    }

    /// Converts every event, skipping (and logging) those that fail.
    pub fn into_events(self) -> Vec<InboundEvent> {
        self.events
            .into_iter()
            .filter_map(|raw| match LineEvent::from_value(raw).and_then(LineEvent::into_event) {
                Ok(event) => Some(event),
                Err(e) => {
                    error!(error = %e, "Skipping unparseable webhook event");
                    None
                }
            })
            .collect()
    }
}

/// One webhook event as LINE sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub webhook_event_id: String,
    #[serde(default)]
    pub timestamp: i64,
    pub source: Option<Value>,
    pub reply_token: Option<String>,
    pub message: Option<LineMessage>,
    pub postback: Option<LinePostback>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinePostback {
    #[serde(default)]
    pub data: String,
}

impl LineEvent {
    pub fn from_value(value: Value) -> AdapterResult<Self> {
        serde_json::from_value(value).map_err(|e| AdapterError::parse(e.to_string()))
    }

    /// Converts to the platform-neutral event.
    ///
    /// Fails when the source is missing or of an unknown type.
    pub fn into_event(self) -> AdapterResult<InboundEvent> {
        let raw_source = self
            .source
            .ok_or_else(|| AdapterError::parse(format!("{} event has no source", self.kind)))?;
        let source: Source = serde_json::from_value(raw_source)
            .map_err(|e| AdapterError::parse(format!("unsupported source: {e}")))?;

        let kind = match self.kind.as_str() {
            "message" => {
                let LineMessage { kind, id, text } = self
                    .message
                    .ok_or_else(|| AdapterError::parse("message event has no message"))?;
                match text {
                    Some(text) if kind == "text" => {
                        EventKind::Message(MessageContent::Text { id, text })
                    }
                    _ => EventKind::Message(MessageContent::Other { id, kind }),
                }
            }
            "follow" => EventKind::Follow,
            "unfollow" => EventKind::Unfollow,
            "join" => EventKind::Join,
            "leave" => EventKind::Leave,
            "postback" => EventKind::Postback {
                data: self.postback.map(|p| p.data).unwrap_or_default(),
            },
            other => EventKind::Other(other.to_string()),
        };

        Ok(InboundEvent {
            id: self.webhook_event_id,
            platform: PLATFORM,
            timestamp: self.timestamp,
            source,
            reply_token: self.reply_token.filter(|t| !t.is_empty()),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use parking_lot::Mutex;

    const PAYLOAD: &str = r#"{
        "destination": "Ubot",
        "events": [
            {
                "type": "message",
                "webhookEventId": "E1",
                "timestamp": 1700000000000,
                "source": {"type": "group", "groupId": "C1", "userId": "U1"},
                "replyToken": "rt-1",
                "message": {"type": "text", "id": "m1", "text": "待辦：買咖啡"}
            },
            {
                "type": "message",
                "webhookEventId": "E2",
                "timestamp": 1700000000001,
                "source": {"type": "user", "userId": "U2"},
                "replyToken": "rt-2",
                "message": {"type": "sticker", "id": "m2", "packageId": "1", "stickerId": "2"}
            },
            {
                "type": "follow",
                "webhookEventId": "E3",
                "timestamp": 1700000000002,
                "source": {"type": "user", "userId": "U3"},
                "replyToken": "rt-3"
            },
            {
                "type": "message",
                "webhookEventId": "E4",
                "timestamp": 1700000000003,
                "source": {"type": "channel", "channelId": "X"},
                "message": {"type": "text", "id": "m4", "text": "help"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_payload() {
        let payload = WebhookPayload::parse(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(payload.destination, "Ubot");
        assert_eq!(payload.events.len(), 4);

        let events = payload.into_events();
        // The unknown source type is skipped.
        assert_eq!(events.len(), 3);

        let text = &events[0];
        assert_eq!(text.id, "E1");
        assert_eq!(text.platform, PLATFORM);
        assert_eq!(text.text(), Some("待辦：買咖啡"));
        assert_eq!(text.reply_token.as_deref(), Some("rt-1"));
        assert_eq!(text.source.scope_id(), "C1");

        assert_eq!(events[1].kind_name(), "message.other");
        assert_eq!(events[1].text(), None);
        assert_eq!(events[2].kind, EventKind::Follow);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unknown_source_logged_as_error() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let events = tracing::subscriber::with_default(subscriber, || {
            WebhookPayload::parse(PAYLOAD.as_bytes())
                .unwrap()
                .into_events()
        });
        assert_eq!(events.len(), 3);

        let logs = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("Skipping unparseable webhook event"));
    }

    #[test]
    fn test_malformed_body() {
        assert!(WebhookPayload::parse(b"not json").is_err());
        assert!(WebhookPayload::parse(b"{\"events\": 3}").is_err());
    }

    #[test]
    fn test_empty_payload_is_valid() {
        let payload = WebhookPayload::parse(b"{\"destination\":\"U\",\"events\":[]}").unwrap();
        assert!(payload.into_events().is_empty());
    }

    #[test]
    fn test_postback_and_unknown_kinds() {
        let postback = LineEvent::from_value(serde_json::json!({
            "type": "postback",
            "source": {"type": "room", "roomId": "R1"},
            "postback": {"data": "action=buy"}
        }))
        .unwrap()
        .into_event()
        .unwrap();
        assert_eq!(
            postback.kind,
            EventKind::Postback {
                data: "action=buy".into()
            }
        );
        assert_eq!(postback.reply_token, None);

        let beacon = LineEvent::from_value(serde_json::json!({
            "type": "beacon",
            "source": {"type": "user", "userId": "U1"}
        }))
        .unwrap()
        .into_event()
        .unwrap();
        assert_eq!(beacon.kind, EventKind::Other("beacon".into()));
    }

    #[test]
    fn test_missing_source_is_error() {
        let err = LineEvent::from_value(serde_json::json!({"type": "follow"}))
            .unwrap()
            .into_event()
            .unwrap_err();
        assert!(matches!(err, AdapterError::Parse { .. }));
    }
}
