//! Configuration validation.

use brass_adapter_line::LineConfig;

use super::error::{ConfigError, ConfigResult};
use super::schema::{BrassConfig, LogOutput, LoggingConfig, ServerConfig};

/// Validates a configuration before the runtime starts.
///
/// The LINE section is required: without credentials the webhook cannot be
/// verified and replies cannot be sent.
pub fn validate_config(config: &BrassConfig) -> ConfigResult<()> {
    validate_logging(&config.logging)?;
    validate_server(&config.server)?;
    validate_line(config)?;
    validate_bot_names(config)?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    for module in logging.filters.keys() {
        if module.is_empty() || module.contains(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: '{module}'"
            )));
        }
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> ConfigResult<()> {
    if server.host.is_empty() {
        return Err(ConfigError::missing_field("server.host"));
    }
    validate_port(server.port)?;
    validate_path(&server.path)?;
    Ok(())
}

fn validate_line(config: &BrassConfig) -> ConfigResult<()> {
    let line: LineConfig = config
        .adapter("line")?
        .ok_or_else(|| ConfigError::missing_field("adapters.line"))?;
    validate_url(&line.api_base)?;
    line.validate()
        .map_err(|e| ConfigError::section("adapters.line", e))
}

fn validate_bot_names(config: &BrassConfig) -> ConfigResult<()> {
    for name in config.bots.keys() {
        if name.is_empty() || name.contains(' ') {
            return Err(ConfigError::validation(format!(
                "Bot section name cannot be empty or contain spaces: '{name}'"
            )));
        }
    }
    Ok(())
}

fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("url"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    }

    Ok(())
}

fn validate_port(port: u16) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

fn validate_path(path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::validation("Webhook path must start with '/'"));
    }
    Ok(())
}
