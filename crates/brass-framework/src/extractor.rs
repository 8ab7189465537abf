//! Handler parameter extraction.
//!
//! Any type implementing [`FromContext`] can appear as a handler parameter.
//! Parameters are extracted in order before the handler body runs; the first
//! failure aborts the call with [`HandlerError::Extract`](crate::HandlerError).
//!
//! ```rust,ignore
//! async fn add_todo(content: Content, session: SessionRef) -> String {
//!     session.update(|a| { /* ... */ });
//!     format!("已新增待辦：{}", content.as_str())
//! }
//! ```

use std::ops::Deref;

use brass_core::{BoxedBot, InboundEvent, SessionKey};

use crate::context::BotContext;
use crate::error::{ExtractError, ExtractResult};
use crate::matcher::extract_content;
use crate::session::{Session, SessionStore};

/// A type that can be extracted from a [`BotContext`].
pub trait FromContext: Sized {
    /// Attempts to extract this type from `ctx`.
    fn from_context(ctx: &BotContext) -> ExtractResult<Self>;
}

/// Optional parameters never fail; a failed inner extraction becomes `None`.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &BotContext) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

// =============================================================================
// Text / Content
// =============================================================================

/// The full message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

impl Text {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl FromContext for Text {
    fn from_context(ctx: &BotContext) -> ExtractResult<Self> {
        ctx.text()
            .map(|t| Text(t.to_owned()))
            .ok_or(ExtractError::NotText)
    }
}

/// The trimmed text after the first delimiter.
///
/// Fails with [`ExtractError::EmptyContent`] when nothing follows the
/// delimiter, which lets a command answer with its usage hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content(pub String);

impl Content {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Content {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl FromContext for Content {
    fn from_context(ctx: &BotContext) -> ExtractResult<Self> {
        let text = ctx.text().ok_or(ExtractError::NotText)?;
        extract_content(text)
            .map(|c| Content(c.to_owned()))
            .ok_or(ExtractError::EmptyContent)
    }
}

// =============================================================================
// Session
// =============================================================================

/// The caller's session, created on first access.
#[derive(Debug, Clone)]
pub struct SessionRef {
    key: SessionKey,
    session: Session,
}

impl SessionRef {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }
}

impl Deref for SessionRef {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.session
    }
}

impl FromContext for SessionRef {
    fn from_context(ctx: &BotContext) -> ExtractResult<Self> {
        Ok(SessionRef {
            key: ctx.session_key().clone(),
            session: ctx.session(),
        })
    }
}

/// The whole store together with the caller's key, for handlers that need to
/// clear the session.
#[derive(Debug, Clone)]
pub struct Sessions {
    key: SessionKey,
    store: SessionStore,
}

impl Sessions {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Forgets the caller's session. Returns whether one existed.
    pub fn clear_current(&self) -> bool {
        self.store.clear(&self.key)
    }
}

impl Deref for Sessions {
    type Target = SessionStore;

    fn deref(&self) -> &SessionStore {
        &self.store
    }
}

impl FromContext for Sessions {
    fn from_context(ctx: &BotContext) -> ExtractResult<Self> {
        Ok(Sessions {
            key: ctx.session_key().clone(),
            store: ctx.sessions().clone(),
        })
    }
}

// =============================================================================
// Bot / Event
// =============================================================================

/// The reply capability for the current event.
#[derive(Clone)]
pub struct BotRef(pub BoxedBot);

impl Deref for BotRef {
    type Target = BoxedBot;

    fn deref(&self) -> &BoxedBot {
        &self.0
    }
}

impl FromContext for BotRef {
    fn from_context(ctx: &BotContext) -> ExtractResult<Self> {
        Ok(BotRef(ctx.bot_arc()))
    }
}

/// A copy of the current event.
#[derive(Debug, Clone)]
pub struct EventRef(pub InboundEvent);

impl Deref for EventRef {
    type Target = InboundEvent;

    fn deref(&self) -> &InboundEvent {
        &self.0
    }
}

impl FromContext for EventRef {
    fn from_context(ctx: &BotContext) -> ExtractResult<Self> {
        Ok(EventRef(ctx.event().clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use brass_core::{ApiResult, Bot, EventKind, Source};

    use super::*;

    struct NullBot;

    #[async_trait]
    impl Bot for NullBot {
        fn id(&self) -> &str {
            "null"
        }

        async fn reply(&self, _reply_token: &str, _texts: &[String]) -> ApiResult<()> {
            Ok(())
        }

        async fn push(&self, _to: &str, _texts: &[String]) -> ApiResult<()> {
            Ok(())
        }
    }

    fn ctx(text: &str) -> BotContext {
        let event = InboundEvent::text_message(
            Source::User {
                user_id: "U1".into(),
            },
            text,
        );
        BotContext::new(event, Arc::new(NullBot), SessionStore::new())
    }

    #[test]
    fn test_text_extracts_full_message() {
        let text = Text::from_context(&ctx("待辦：買咖啡")).unwrap();
        assert_eq!(text.as_str(), "待辦：買咖啡");
    }

    #[test]
    fn test_content_after_delimiter() {
        let content = Content::from_context(&ctx("待辦： 買咖啡 ")).unwrap();
        assert_eq!(content.as_str(), "買咖啡");
    }

    #[test]
    fn test_content_empty_is_error() {
        let err = Content::from_context(&ctx("待辦：")).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyContent));
        assert!(Option::<Content>::from_context(&ctx("待辦：")).unwrap().is_none());
    }

    #[test]
    fn test_non_text_event() {
        let mut event = InboundEvent::text_message(
            Source::User {
                user_id: "U1".into(),
            },
            "",
        );
        event.kind = EventKind::Follow;
        let ctx = BotContext::new(event, Arc::new(NullBot), SessionStore::new());
        assert!(matches!(
            Text::from_context(&ctx).unwrap_err(),
            ExtractError::NotText
        ));
    }

    #[test]
    fn test_session_ref_and_sessions_share_store() {
        let ctx = ctx("hi");
        let session = SessionRef::from_context(&ctx).unwrap();
        session.update(|a| a.set_mode("stock"));
        assert_eq!(session.key().as_str(), "U1:U1");

        let sessions = Sessions::from_context(&ctx).unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions.clear_current());
        assert!(sessions.is_empty());
    }
}
