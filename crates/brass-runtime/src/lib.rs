//! # Brass Runtime
//!
//! Orchestration for a Brass bot process:
//!
//! - layered configuration ([`config`]) via figment: defaults, `brass.toml`,
//!   `BRASS_*` environment variables
//! - logging setup ([`logging`]) via `tracing-subscriber`
//! - [`BrassRuntime`], which builds the session store, dispatcher and LINE
//!   adapter, serves the webhook and shuts down gracefully
//!
//! ```rust,ignore
//! use brass_runtime::BrassRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = BrassRuntime::builder().build()?;
//!     runtime.register_commands(my_commands());
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{BrassConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{BrassRuntime, RunningRuntime, RuntimeBuilder};

pub use tracing;

/// Logging macros for bot crates.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
