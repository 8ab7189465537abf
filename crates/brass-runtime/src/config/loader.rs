//! Configuration loader using figment.
//!
//! Sources are layered: built-in defaults, TOML/YAML files, `BRASS_*`
//! environment variables and programmatic overrides. A profile selects an
//! additional `brass.{profile}.toml` file.
//!
//! # Feature Flags
//!
//! - `toml-config`: `brass.toml`, `config.toml`
//! - `yaml-config`: `brass.yaml`, `brass.yml`, `config.yaml`, `config.yml`
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Main config file (`brass.toml`)
//! 3. Profile-specific config file (`brass.{profile}.toml`)
//! 4. Environment variables (`BRASS_*`)
//! 5. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! - `BRASS_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `BRASS_SERVER__PORT=9000` → `server.port = 9000`
//! - `BRASS_ADAPTERS__LINE__ACCESS_TOKEN=xxx` → `adapters.line.access_token = "xxx"`
//!
//! # Example
//!
//! ```rust,ignore
//! use brass_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//!
//! // ./deploy/brass.toml, then ./deploy/brass.production.toml if present
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./deploy/brass.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::BrassConfig;

const ENV_PREFIX: &str = "BRASS_";
const PROFILE_VAR: &str = "BRASS_PROFILE";
const APP_DIR: &str = "brass";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Creates a profile from environment variable or defaults to Development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Base figment instance.
    figment: Figment,
    /// Configuration profile.
    profile: Profile,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: BrassConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Overrides a single key, e.g. `("server.port", 9000)`.
    pub fn set<V: serde::Serialize>(mut self, key: &str, value: V) -> Self {
        self.figment = self.figment.merge(Serialized::default(key, value));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<BrassConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: BrassConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(BrassConfig::default()));
        let user_figment = std::mem::take(&mut self.figment);

        let base = match self.config_file.take() {
            Some(path) if !path.exists() => return Err(ConfigError::FileNotFound(path)),
            Some(path) => Some(path),
            None => self.find_base_file(),
        };
        match base {
            Some(base) => {
                info!(path = %base.display(), "Loading configuration file");
                figment = Self::merge_config_file(figment, &base)?;
                if let Some(overlay) = self.profile_overlay(&base) {
                    debug!(path = %overlay.display(), profile = %self.profile, "Loading profile file");
                    figment = Self::merge_config_file(figment, &overlay)?;
                }
            }
            None => warn!("No configuration file found, using defaults"),
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        // Programmatic overrides win over files and environment.
        Ok(figment.merge(user_figment))
    }

    /// Merges a single config file, dispatching on its extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Explicit search paths, or the working directory and the user config
    /// directory.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_DIR));
        }
        paths
    }

    /// The first existing `search path × file name` pair.
    fn find_base_file(&self) -> Option<PathBuf> {
        self.resolve_search_paths().into_iter().find_map(|dir| {
            file_names()
                .into_iter()
                .map(|name| dir.join(name))
                .find(|path| path.exists())
        })
    }

    /// `brass.{profile}.toml` beside `brass.toml`, if it exists.
    fn profile_overlay(&self, base: &Path) -> Option<PathBuf> {
        let stem = base.file_stem()?.to_str()?;
        let ext = base.extension()?.to_str()?;
        let overlay = base.with_file_name(format!("{stem}.{}.{ext}", self.profile.as_str()));
        overlay.exists().then_some(overlay)
    }
}

/// Base file names, in search order, for the enabled formats.
#[allow(unused_mut)]
fn file_names() -> Vec<&'static str> {
    let mut names = Vec::new();
    #[cfg(feature = "toml-config")]
    names.extend(["brass.toml", "config.toml"]);
    #[cfg(feature = "yaml-config")]
    names.extend(["brass.yaml", "brass.yml", "config.yaml", "config.yml"]);
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("brass-config-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config() {
        let config = ConfigLoader::new()
            .search_path(temp_dir("empty"))
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.logging.level.as_str(), "info");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.path, "/callback");
        assert!(config.adapters.is_empty());
    }

    #[test]
    fn test_programmatic_override() {
        let config = ConfigLoader::new()
            .search_path(temp_dir("override"))
            .without_env()
            .set("server.port", 9000)
            .set("logging.level", "debug")
            .load()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new()
            .file("/definitely/not/here/brass.toml")
            .without_env()
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_profile_parse() {
        assert!(matches!(Profile::parse("PROD"), Profile::Production));
        assert!(matches!(Profile::parse("dev"), Profile::Development));
        assert_eq!(Profile::parse("Staging").as_str(), "staging");
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_toml_file_with_profile() {
        use std::io::Write;

        let dir = temp_dir("toml");
        let mut base = std::fs::File::create(dir.join("brass.toml")).unwrap();
        writeln!(
            base,
            r#"
[server]
port = 8081

[adapters.line]
channel_secret = "s"
access_token = "t"

[bots.assistant]
default_city = "臺中市"
"#
        )
        .unwrap();
        let mut prod = std::fs::File::create(dir.join("brass.production.toml")).unwrap();
        writeln!(prod, "[server]\nport = 443").unwrap();

        let config = ConfigLoader::new()
            .search_path(&dir)
            .profile("production")
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.server.port, 443);
        assert!(config.adapters.contains_key("line"));
        assert!(config.bots.contains_key("assistant"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_explicit_file_gets_profile_overlay() {
        let dir = temp_dir("explicit");
        std::fs::write(dir.join("bot.toml"), "[server]\nport = 8081\npath = \"/hook\"\n").unwrap();
        std::fs::write(dir.join("bot.staging.toml"), "[server]\nport = 8443\n").unwrap();

        let config = ConfigLoader::new()
            .file(dir.join("bot.toml"))
            .profile("staging")
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.server.port, 8443);
        assert_eq!(config.server.path, "/hook");

        let config = ConfigLoader::new()
            .file(dir.join("bot.toml"))
            .profile("production")
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.server.port, 8081);

        let _ = std::fs::remove_dir_all(dir);
    }
}
