//! Runtime error types.

use brass_core::{AdapterError, ApiError, TransportError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while starting or running the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No `adapters.<name>` section was configured.
    #[error("Adapter '{0}' is not configured")]
    MissingAdapter(&'static str),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Platform API error: {0}")]
    Api(#[from] ApiError),

    /// The webhook listener could not be started.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
