//! What the user sees when a data service fails.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ServiceResult;

/// Per-command handling of external API failures.
///
/// ```toml
/// [bots.assistant.stock]
/// on_failure = { notify = "查無資料" }
///
/// [bots.assistant.weather]
/// on_failure = "propagate"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFailurePolicy {
    /// Reply with a fixed message and log at warn level.
    Notify(String),
    /// Hand the error to the dispatcher's failure policy.
    Propagate,
}

impl ApiFailurePolicy {
    pub fn notify(message: impl Into<String>) -> Self {
        Self::Notify(message.into())
    }

    /// Turns a lookup result into the handler's reply.
    pub fn resolve(&self, service: &str, result: ServiceResult<String>) -> ServiceResult<String> {
        match (result, self) {
            (Ok(reply), _) => Ok(reply),
            (Err(e), Self::Notify(message)) => {
                warn!(service, error = %e, "Data service failed, notifying user");
                Ok(message.clone())
            }
            (Err(e), Self::Propagate) => Err(e),
        }
    }
}
