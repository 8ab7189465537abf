//! Configuration schema definitions.
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "compact"
//!
//! [logging.filters]
//! brass_transport = "debug"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! path = "/callback"
//!
//! [adapters.line]
//! channel_secret = "..."
//! access_token = "..."
//!
//! [dispatcher]
//! failure_policy = "log_and_continue"
//!
//! [bots.assistant]
//! default_city = "臺北市"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use brass_framework::FailurePolicy;
use figment::value::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrassConfig {
    /// Logging settings.
    pub logging: LoggingConfig,

    /// Webhook listener settings.
    pub server: ServerConfig,

    /// Per-adapter sections, keyed by adapter name (e.g. `line`).
    pub adapters: HashMap<String, Value>,

    /// Dispatcher settings.
    pub dispatcher: DispatcherConfig,

    /// Free-form per-bot sections, extracted by the bot binaries.
    pub bots: HashMap<String, Value>,
}

impl BrassConfig {
    /// Deserializes `adapters.<name>`, or `None` when the section is absent.
    pub fn adapter<T: DeserializeOwned>(&self, name: &str) -> ConfigResult<Option<T>> {
        self.adapters
            .get(name)
            .map(|value| {
                value
                    .deserialize()
                    .map_err(|e| ConfigError::section(format!("adapters.{name}"), e))
            })
            .transpose()
    }

    /// Deserializes `bots.<name>`, falling back to `T::default()` when absent.
    pub fn bot<T: DeserializeOwned + Default>(&self, name: &str) -> ConfigResult<T> {
        match self.bots.get(name) {
            Some(value) => value
                .deserialize()
                .map_err(|e| ConfigError::section(format!("bots.{name}"), e)),
            None => Ok(T::default()),
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `compact` otherwise.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// File rotation for `output = "file"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level; `RUST_LOG` takes precedence when set.
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    pub span_events: SpanEventConfig,
    pub thread_ids: bool,
    /// Include file and line in log lines.
    pub file_location: bool,
    /// Log file for `output = "file"`.
    pub file_path: Option<PathBuf>,
    pub rotation: LogRotation,
    /// Per-module levels, e.g. `brass_transport = "debug"`.
    pub filters: HashMap<String, LogLevel>,
}

// =============================================================================
// Server
// =============================================================================

/// Webhook listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Webhook path.
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            path: "/callback".to_string(),
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Dispatcher configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub failure_policy: FailurePolicy,
}
