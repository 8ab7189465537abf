//! LINE Messaging API bot.
//!
//! [`LineBot`] is the [`Bot`] implementation for LINE: replies go through
//! `/v2/bot/message/reply` with the event's reply token, pushes through
//! `/v2/bot/message/push` with a fresh `X-Line-Retry-Key`.
//!
//! ```rust,ignore
//! let bot = LineBot::new(&config)?;
//! bot.push("Uxxxxxxxx", &["早安".to_string()]).await?;
//! ```

use async_trait::async_trait;
use brass_core::{ApiError, ApiResult, Bot, TransportError};
use brass_transport::HttpClient;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::LineConfig;
use crate::model::api::{ErrorResponse, MAX_MESSAGES, PushRequest, ReplyRequest, text_messages};

const RETRY_KEY_HEADER: &str = "X-Line-Retry-Key";

/// A LINE bot account.
#[derive(Debug, Clone)]
pub struct LineBot {
    id: String,
    client: HttpClient,
    api_base: String,
    access_token: String,
}

impl LineBot {
    /// Creates a bot from the adapter configuration.
    pub fn new(config: &LineConfig) -> ApiResult<Self> {
        let client = HttpClient::with_timeout(config.timeout())?;
        Ok(Self {
            id: config.bot_id.clone(),
            client,
            api_base: config.api_base().to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn check_count(&self, texts: &[String]) {
        if texts.len() > MAX_MESSAGES {
            warn!(
                bot_id = %self.id,
                count = texts.len(),
                max = MAX_MESSAGES,
                "Too many messages for one call, extra messages dropped"
            );
        }
    }
}

/// Maps transport failures onto API errors, decoding LINE's error body.
fn api_error(err: TransportError) -> ApiError {
    match err {
        TransportError::Status { status, body } => {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.describe())
                .unwrap_or(body);
            ApiError::Rejected { status, message }
        }
        TransportError::Timeout => ApiError::Timeout,
        other => ApiError::Transport(other),
    }
}

#[async_trait]
impl Bot for LineBot {
    fn id(&self) -> &str {
        &self.id
    }

    async fn reply(&self, reply_token: &str, texts: &[String]) -> ApiResult<()> {
        self.check_count(texts);
        let body = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages: text_messages(texts),
        };
        debug!(bot_id = %self.id, count = body.messages.len(), "Sending reply");

        let request = self
            .client
            .post(&self.url("/v2/bot/message/reply"))
            .bearer_auth(&self.access_token)
            .json(&body);
        self.client.send(request).await.map_err(api_error)
    }

    async fn push(&self, to: &str, texts: &[String]) -> ApiResult<()> {
        self.check_count(texts);
        let body = PushRequest {
            to: to.to_string(),
            messages: text_messages(texts),
        };
        let retry_key = Uuid::new_v4().to_string();
        debug!(bot_id = %self.id, to = %to, retry_key = %retry_key, "Sending push");

        let request = self
            .client
            .post(&self.url("/v2/bot/message/push"))
            .bearer_auth(&self.access_token)
            .header(RETRY_KEY_HEADER, retry_key)
            .json(&body);
        self.client.send(request).await.map_err(api_error)
    }
}
