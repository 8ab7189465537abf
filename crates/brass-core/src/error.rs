//! Unified error types for the Brass core.
//!
//! Framework-level errors (extraction, handler, dispatch) live in
//! `brass-framework`; these are the errors shared by every layer.

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Binding the listener failed.
    #[error("failed to bind {addr}: {reason}")]
    BindFailed {
        /// The address that could not be bound.
        addr: String,
        /// Reason for failure.
        reason: String,
    },

    /// The remote side answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The response body was not the expected JSON.
    #[error("malformed response body: {0}")]
    Decode(String),

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Adapter Errors
// =============================================================================

/// Errors that can occur in adapter operations.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// Event parsing failed.
    #[error("failed to parse event: {reason}")]
    Parse {
        /// Reason for failure.
        reason: String,
    },

    /// The webhook signature header was missing or did not match.
    #[error("webhook signature rejected: {0}")]
    Signature(String),

    /// Adapter configuration is unusable.
    #[error("invalid adapter configuration: {0}")]
    Config(String),

    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AdapterError {
    /// Creates a parse error.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for platform API calls (reply/push).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The platform rejected the call.
    #[error("API error ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the platform.
        message: String,
    },
    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,
    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The event carries neither a reply token nor a push target.
    #[error("event has no reply route")]
    NoRoute,
    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
