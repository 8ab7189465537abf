//! Outbound Messaging API request and response bodies.

use serde::{Deserialize, Serialize};

/// Maximum number of messages in one reply or push call.
pub const MAX_MESSAGES: usize = 5;

/// Maximum length of a text message, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// A text message object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "text")]
pub struct TextMessage {
    pub text: String,
}

impl TextMessage {
    /// Creates a text message, truncating it to [`MAX_TEXT_CHARS`].
    pub fn new(text: &str) -> Self {
        Self {
            text: truncate_chars(text, MAX_TEXT_CHARS).to_string(),
        }
    }
}

/// `POST /v2/bot/message/reply`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<TextMessage>,
}

/// `POST /v2/bot/message/push`
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest {
    pub to: String,
    pub messages: Vec<TextMessage>,
}

/// Error body returned by the Messaging API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub property: String,
}

impl ErrorResponse {
    /// A one-line description of the error, including details.
    pub fn describe(&self) -> String {
        if self.details.is_empty() {
            return self.message.clone();
        }
        let details: Vec<String> = self
            .details
            .iter()
            .map(|d| format!("{}: {}", d.property, d.message))
            .collect();
        format!("{} ({})", self.message, details.join("; "))
    }
}

/// Returns at most `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Builds message objects, keeping at most [`MAX_MESSAGES`].
pub fn text_messages(texts: &[String]) -> Vec<TextMessage> {
    texts
        .iter()
        .take(MAX_MESSAGES)
        .map(|t| TextMessage::new(t))
        .collect()
}
