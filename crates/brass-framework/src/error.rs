//! Error types for the Brass framework.

use brass_core::ApiError;
use thiserror::Error;

/// Errors that can occur during context extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The event is not a text message.
    #[error("event is not a text message")]
    NotText,

    /// Nothing follows the delimiter.
    ///
    /// Commands with a usage hint answer this with the hint instead of
    /// treating it as a failure.
    #[error("no content after delimiter")]
    EmptyContent,

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// A handler did not complete successfully.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// A handler parameter could not be extracted.
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Sending the reply failed.
    #[error("reply failed: {0}")]
    Reply(#[from] ApiError),

    /// The handler returned an error.
    #[error("{0}")]
    Failed(String),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Creates a failure from any displayable error, keeping its cause chain.
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(format!("{err:#}"))
    }
}

/// Result type for handler invocations.
pub type HandlerResult = Result<(), HandlerError>;

/// Errors surfaced by the dispatcher under `FailurePolicy::Propagate`.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// A command's handler failed.
    #[error("command '{command}' failed: {source}")]
    Handler {
        /// Name of the failing command.
        command: String,
        /// The handler failure.
        #[source]
        source: HandlerError,
    },
}
