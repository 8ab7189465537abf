//! Runtime orchestration.
//!
//! [`BrassRuntime`] owns the configuration, the session store and the
//! command list. Starting it wires everything together:
//!
//! ```text
//! BrassConfig ─┬─▶ SessionStore ─┐
//!              ├─▶ commands ─────┴─▶ Dispatcher ─┐
//!              └─▶ LineConfig ──▶ LineBot ───────┴─▶ LineAdapter ──▶ WebhookServer
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use brass_runtime::BrassRuntime;
//!
//! let mut runtime = BrassRuntime::builder().profile("production").build()?;
//! runtime.register_commands(commands);
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use brass_adapter_line::{LineAdapter, LineBot, LineConfig};
use brass_core::ListenerHandle;
use brass_framework::{Command, Dispatcher, SessionStore};
use brass_transport::WebhookServer;
use serde::de::DeserializeOwned;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{BrassConfig, ConfigLoader, ConfigResult, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The Brass runtime.
pub struct BrassRuntime {
    config: BrassConfig,
    sessions: SessionStore,
    commands: Vec<Command>,
    shutdown: CancellationToken,
}

impl BrassRuntime {
    /// Creates a runtime builder that loads configuration from files and
    /// environment.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration and installs
    /// the global subscriber. The configuration is not validated here.
    pub fn from_config(config: BrassConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );

        Self {
            config,
            sessions: SessionStore::new(),
            commands: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &BrassConfig {
        &self.config
    }

    /// The process-wide session store shared by every dispatch.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Deserializes the `bots.<name>` section.
    pub fn bot_config<T: DeserializeOwned + Default>(&self, name: &str) -> RuntimeResult<T> {
        Ok(self.config.bot(name)?)
    }

    /// Appends a command. Registration order is dispatch order.
    pub fn register_command(&mut self, command: Command) -> &mut Self {
        debug!(command = command.name(), "Registered command");
        self.commands.push(command);
        self
    }

    pub fn register_commands(&mut self, commands: impl IntoIterator<Item = Command>) -> &mut Self {
        for command in commands {
            self.register_command(command);
        }
        self
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// A token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Builds a dispatcher over the registered commands and the shared
    /// session store.
    pub fn dispatcher(&self) -> Dispatcher {
        let mut dispatcher = Dispatcher::new(self.sessions.clone())
            .failure_policy(self.config.dispatcher.failure_policy);
        for command in &self.commands {
            dispatcher.add(command.clone());
        }
        dispatcher
    }

    /// The `adapters.line` section.
    pub fn line_config(&self) -> RuntimeResult<LineConfig> {
        let config: LineConfig = self
            .config
            .adapter("line")?
            .ok_or(RuntimeError::MissingAdapter("line"))?;
        config.validate()?;
        Ok(config)
    }

    /// A LINE client for pushes outside a webhook, e.g. from a CLI.
    pub fn line_bot(&self) -> RuntimeResult<LineBot> {
        Ok(LineBot::new(&self.line_config()?)?)
    }

    /// Binds the webhook listener and returns once it accepts requests.
    pub async fn start(&self) -> RuntimeResult<RunningRuntime> {
        let line = self.line_config()?;
        let bot = Arc::new(LineBot::new(&line)?);
        let dispatcher = self.dispatcher();
        info!(
            commands = dispatcher.command_count(),
            policy = ?dispatcher.policy(),
            "Dispatcher ready"
        );

        let adapter = LineAdapter::new(line.channel_secret.clone(), bot, dispatcher);
        let server = &self.config.server;
        let listener = WebhookServer::new()
            .listen(&server.addr(), &server.path, Arc::new(adapter.clone()))
            .await?;

        info!(addr = %listener.local_addr, path = %server.path, "Brass runtime started");
        Ok(RunningRuntime { listener, adapter })
    }

    /// Runs until Ctrl+C, SIGTERM or the [shutdown token](Self::shutdown_token).
    pub async fn run(self) -> RuntimeResult<()> {
        let token = self.shutdown.clone();
        self.run_until(wait_for_shutdown(token)).await
    }

    /// Runs until `shutdown` completes, then stops the listener and waits for
    /// in-flight dispatches.
    pub async fn run_until<F>(self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let running = self.start().await?;
        info!("Brass runtime is now running. Press Ctrl+C to stop.");

        shutdown.await;

        running.stop().await;
        Ok(())
    }
}

impl std::fmt::Debug for BrassRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrassRuntime")
            .field("server", &self.config.server)
            .field("commands", &self.commands.len())
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

/// A started runtime.
pub struct RunningRuntime {
    listener: ListenerHandle,
    adapter: LineAdapter,
}

impl RunningRuntime {
    /// The bound `host:port`.
    pub fn local_addr(&self) -> &str {
        &self.listener.local_addr
    }

    /// Stops accepting webhooks and waits for dispatches already spawned.
    pub async fn stop(self) {
        let Self { listener, adapter } = self;
        listener.stop();
        adapter.drain().await;
        info!("Brass runtime stopped");
    }
}

/// Waits for Ctrl+C, SIGTERM or `token` cancellation.
async fn wait_for_shutdown(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
        _ = token.cancelled() => info!("Shutdown requested"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`BrassRuntime`] backed by [`ConfigLoader`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    validate: bool,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            validate: true,
        }
    }

    /// Loads this file instead of searching for one.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. `development`, `production`).
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: BrassConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Overrides a single key, e.g. `("server.port", 9000)`.
    pub fn set<V: serde::Serialize>(mut self, key: &str, value: V) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Skips [`validate_config`]; for tools that only need part of the
    /// configuration.
    pub fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Loads, validates and builds the runtime.
    pub fn build(self) -> ConfigResult<BrassRuntime> {
        let config = self.config_loader.load()?;
        if self.validate {
            validate_config(&config)?;
        }
        Ok(BrassRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brass_adapter_line::signature::sign;
    use brass_framework::Content;
    use figment::value::Value;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "runtime-secret";

    fn config(api_base: &str) -> BrassConfig {
        let mut config = BrassConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.adapters.insert(
            "line".to_string(),
            Value::serialize(LineConfig::new(SECRET, "token").with_api_base(api_base)).unwrap(),
        );
        config
    }

    fn todo_command() -> Command {
        Command::prefix("todo", ["待辦"])
            .usage("用法：待辦：<內容>")
            .handler(|c: Content| async move { format!("已新增待辦：{}", c.as_str()) })
    }

    #[test]
    fn test_dispatcher_uses_registered_commands() {
        let mut runtime = BrassRuntime::from_config(BrassConfig::default());
        runtime
            .register_command(Command::exact("help", ["help"]))
            .register_commands([todo_command()]);

        let dispatcher = runtime.dispatcher();
        assert_eq!(dispatcher.command_count(), 2);
        let names: Vec<_> = dispatcher.commands().map(|c| c.name().to_string()).collect();
        assert_eq!(names, ["help", "todo"]);
    }

    #[test]
    fn test_missing_line_section() {
        let runtime = BrassRuntime::from_config(BrassConfig::default());
        assert!(matches!(
            runtime.line_bot(),
            Err(RuntimeError::MissingAdapter("line"))
        ));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = BrassRuntime::builder()
            .search_path(std::env::temp_dir().join("brass-runtime-none"))
            .without_env()
            .build();
        assert!(result.is_err());

        let runtime = BrassRuntime::builder()
            .search_path(std::env::temp_dir().join("brass-runtime-none"))
            .without_env()
            .skip_validation()
            .build()
            .unwrap();
        assert_eq!(runtime.config().server.port, 8080);
    }

    #[tokio::test]
    async fn test_webhook_round_trip() {
        let line = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .and(body_json(json!({
                "replyToken": "rt-0",
                "messages": [{"type": "text", "text": "已新增待辦：買咖啡"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&line)
            .await;

        let mut runtime = BrassRuntime::from_config(config(&line.uri()));
        runtime.register_command(todo_command());
        let running = runtime.start().await.unwrap();

        let body = serde_json::to_vec(&json!({
            "destination": "Ubot",
            "events": [{
                "type": "message",
                "webhookEventId": "E0",
                "timestamp": 1_700_000_000_000i64,
                "source": {"type": "user", "userId": "U1"},
                "replyToken": "rt-0",
                "message": {"type": "text", "id": "m0", "text": "待辦：買咖啡"}
            }]
        }))
        .unwrap();
        let signature = sign(SECRET, &body).unwrap();

        let url = format!("http://{}/callback", running.local_addr());
        let response = reqwest::Client::new()
            .post(&url)
            .header("X-Line-Signature", signature)
            .body(body.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let forged = reqwest::Client::new()
            .post(&url)
            .header("X-Line-Signature", "Zm9yZ2Vk")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(forged.status(), 401);

        running.stop().await;
    }

    #[tokio::test]
    async fn test_run_until_stops_on_token() {
        let line = MockServer::start().await;
        let runtime = BrassRuntime::from_config(config(&line.uri()));
        let token = runtime.shutdown_token();

        let task = tokio::spawn(async move {
            let token = runtime.shutdown_token();
            runtime.run_until(token.cancelled_owned()).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
