//! Data-service errors.

use brass::core::TransportError;
use thiserror::Error;

/// A stock, weather or transit lookup failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The query was understood but the service has nothing for it.
    #[error("no data for '{0}'")]
    NotFound(String),

    #[error("{service} is not configured: missing {field}")]
    NotConfigured {
        service: &'static str,
        field: &'static str,
    },

    /// The service answered with an unexpected shape.
    #[error("unexpected response: {0}")]
    Malformed(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
