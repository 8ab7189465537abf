//! Inbound event model.
//!
//! Adapters translate platform payloads into [`InboundEvent`]s. The model is
//! deliberately small: the dispatcher only needs the conversation [`Source`],
//! the message text and a way to route a reply.
//!
//! ```text
//! InboundEvent { id, platform, timestamp, source, reply_token }
//! └── EventKind
//!     ├── Message(MessageContent::Text | MessageContent::Other)
//!     ├── Follow / Unfollow / Join / Leave
//!     ├── Postback { data }
//!     └── Other(type name)
//! ```

use serde::{Deserialize, Serialize};

/// Where an event originated.
///
/// The serde representation follows the LINE webhook `source` object, so
/// adapters for that platform can deserialize it directly. Any other `type`
/// value fails deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    /// One-to-one chat with a user.
    User {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Group chat. `user_id` is absent when the member has not consented to
    /// sharing their profile.
    Group {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    /// Multi-person chat (room).
    Room {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
}

impl Source {
    /// Returns the sending user, if known.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } => Some(user_id),
            Self::Group { user_id, .. } | Self::Room { user_id, .. } => user_id.as_deref(),
        }
    }

    /// Returns the conversation-scope identifier: group id, room id, or the
    /// user id for direct chats.
    pub fn scope_id(&self) -> &str {
        match self {
            Self::User { user_id } => user_id,
            Self::Group { group_id, .. } => group_id,
            Self::Room { room_id, .. } => room_id,
        }
    }

    /// Returns the identifier a push message must be addressed to in order
    /// to reach this conversation.
    pub fn push_target(&self) -> &str {
        self.scope_id()
    }

    /// Short name of the source type (`user`, `group`, `room`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Group { .. } => "group",
            Self::Room { .. } => "room",
        }
    }
}

/// Content of a message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text message.
    Text {
        /// Platform message id.
        id: String,
        /// Message text as typed by the user.
        text: String,
    },
    /// Any non-text message (sticker, image, location, ...).
    Other {
        /// Platform message id.
        id: String,
        /// Platform message type name.
        kind: String,
    },
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A message was sent to the bot.
    Message(MessageContent),
    /// The bot was added as a friend or unblocked.
    Follow,
    /// The bot was blocked.
    Unfollow,
    /// The bot joined a group or room.
    Join,
    /// The bot was removed from a group or room.
    Leave,
    /// A postback action was triggered.
    Postback {
        /// Postback payload.
        data: String,
    },
    /// Any event type this model does not distinguish.
    Other(String),
}

/// An event received from a messaging platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Platform event id, used for log correlation.
    pub id: String,
    /// Name of the platform the event came from (e.g. `"line"`).
    pub platform: &'static str,
    /// Event time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Conversation the event belongs to.
    pub source: Source,
    /// Single-use reply routing token, when the platform supplied one.
    pub reply_token: Option<String>,
    /// Event payload.
    pub kind: EventKind,
}

impl InboundEvent {
    /// Returns the message text for text message events.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Message(MessageContent::Text { text, .. }) => Some(text),
            _ => None,
        }
    }

    /// Short name of the event kind, for logging.
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            EventKind::Message(MessageContent::Text { .. }) => "message.text",
            EventKind::Message(MessageContent::Other { .. }) => "message.other",
            EventKind::Follow => "follow",
            EventKind::Unfollow => "unfollow",
            EventKind::Join => "join",
            EventKind::Leave => "leave",
            EventKind::Postback { .. } => "postback",
            EventKind::Other(name) => name,
        }
    }

    /// Builds a text message event. Mostly useful for tests and tooling.
    pub fn text_message(source: Source, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            platform: "test",
            timestamp: 0,
            source,
            reply_token: Some("reply-token".to_string()),
            kind: EventKind::Message(MessageContent::Text {
                id: String::new(),
                text: text.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_deserialize_group() {
        let source: Source =
            serde_json::from_str(r#"{"type":"group","groupId":"G1","userId":"U1"}"#).unwrap();
        assert_eq!(
            source,
            Source::Group {
                group_id: "G1".into(),
                user_id: Some("U1".into())
            }
        );
        assert_eq!(source.scope_id(), "G1");
        assert_eq!(source.user_id(), Some("U1"));
    }

    #[test]
    fn test_source_room_without_user() {
        let source: Source = serde_json::from_str(r#"{"type":"room","roomId":"R1"}"#).unwrap();
        assert_eq!(source.user_id(), None);
        assert_eq!(source.push_target(), "R1");
        assert_eq!(source.kind(), "room");
    }

    #[test]
    fn test_source_unknown_type_rejected() {
        let result = serde_json::from_str::<Source>(r#"{"type":"channel","channelId":"C1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_text_accessor() {
        let source = Source::User {
            user_id: "U1".into(),
        };
        let event = InboundEvent::text_message(source.clone(), "hello");
        assert_eq!(event.text(), Some("hello"));
        assert_eq!(event.kind_name(), "message.text");

        let follow = InboundEvent {
            kind: EventKind::Follow,
            ..event
        };
        assert_eq!(follow.text(), None);
    }
}
