//! Runtime configuration: schema, figment-based loading and validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    BrassConfig, DispatcherConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    ServerConfig, SpanEventConfig,
};
pub use validation::validate_config;
