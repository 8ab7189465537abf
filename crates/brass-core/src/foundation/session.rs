//! Session keys.
//!
//! A [`SessionKey`] identifies one sender inside one conversation and has the
//! form `"<userId>:<scopeId>"`. The scope is the group id for group chats,
//! the room id for rooms, and the user id itself for direct chats.

use std::fmt;

use super::event::{InboundEvent, Source};

/// User part used when a group or room event carries no user id.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Deterministic identifier of a sender + conversation pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    /// Derives the key for a conversation source.
    pub fn derive(source: &Source) -> Self {
        let user = source.user_id().unwrap_or(ANONYMOUS_USER);
        Self(format!("{}:{}", user, source.scope_id()))
    }

    /// Derives the key for the source of an event.
    pub fn for_event(event: &InboundEvent) -> Self {
        Self::derive(&event.source)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Source> for SessionKey {
    fn from(source: &Source) -> Self {
        Self::derive(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_chat_key() {
        let source = Source::User {
            user_id: "U1".into(),
        };
        assert_eq!(SessionKey::derive(&source).as_str(), "U1:U1");
    }

    #[test]
    fn test_group_and_room_keys() {
        let group = Source::Group {
            group_id: "G1".into(),
            user_id: Some("U1".into()),
        };
        let room = Source::Room {
            room_id: "R1".into(),
            user_id: Some("U1".into()),
        };
        assert_eq!(SessionKey::derive(&group).as_str(), "U1:G1");
        assert_eq!(SessionKey::derive(&room).as_str(), "U1:R1");
    }

    #[test]
    fn test_missing_user_uses_placeholder() {
        let group = Source::Group {
            group_id: "G1".into(),
            user_id: None,
        };
        assert_eq!(SessionKey::derive(&group).as_str(), "anonymous:G1");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let sources = [
            Source::User {
                user_id: "U9".into(),
            },
            Source::Group {
                group_id: "G9".into(),
                user_id: Some("U9".into()),
            },
            Source::Room {
                room_id: "R9".into(),
                user_id: None,
            },
        ];
        for source in &sources {
            assert_eq!(SessionKey::derive(source), SessionKey::derive(source));
        }
    }

    #[test]
    fn test_same_conversation_same_key() {
        let source = Source::Group {
            group_id: "G1".into(),
            user_id: Some("U1".into()),
        };
        let first = InboundEvent::text_message(source.clone(), "help");
        let second = InboundEvent::text_message(source, "待辦：買咖啡");
        assert_eq!(SessionKey::for_event(&first), SessionKey::for_event(&second));
    }
}
