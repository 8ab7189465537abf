//! Configuration for the LINE adapter.
//!
//! Loaded from the `adapters.line` section of the global configuration:
//!
//! ```toml
//! [adapters.line]
//! channel_secret = "..."        # or BRASS_ADAPTERS__LINE__CHANNEL_SECRET
//! access_token = "..."          # channel access token
//! api_base = "https://api.line.me"
//! timeout_secs = 30
//! ```

use std::time::Duration;

use brass_core::{AdapterError, AdapterResult};
use serde::{Deserialize, Serialize};

/// Default Messaging API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.line.me";

/// LINE adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Bot identifier used in logs.
    pub bot_id: String,

    /// Channel secret; the HMAC key for `X-Line-Signature`.
    pub channel_secret: String,

    /// Channel access token for the Messaging API.
    pub access_token: String,

    /// Messaging API base URL.
    pub api_base: String,

    /// API call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            bot_id: "line".to_string(),
            channel_secret: String::new(),
            access_token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl LineConfig {
    /// Creates a configuration with credentials and defaults elsewhere.
    pub fn new(channel_secret: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Overrides the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API base without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    /// Checks that the credentials are present and the base URL is usable.
    pub fn validate(&self) -> AdapterResult<()> {
        if self.channel_secret.is_empty() {
            return Err(AdapterError::Config("channel_secret is required".into()));
        }
        if self.access_token.is_empty() {
            return Err(AdapterError::Config("access_token is required".into()));
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(AdapterError::Config(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AdapterError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
