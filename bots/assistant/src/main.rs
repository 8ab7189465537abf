//! Assistant Bot
//!
//! A LINE bot that keeps per-user todos, notes and a mode, and answers
//! stock, weather and bus queries.
//!
//! # Usage
//!
//! ```bash
//! # Serve the webhook (reads brass.toml from the working directory)
//! assistant
//! assistant --profile prod serve
//!
//! # Push a one-off message
//! assistant push --to U0123456789abcdef "今天下午三點開會"
//! ```
//!
//! Secrets can come from the environment instead of the config file:
//!
//! ```bash
//! BRASS_ADAPTERS__LINE__CHANNEL_SECRET=... \
//! BRASS_ADAPTERS__LINE__ACCESS_TOKEN=... \
//! BRASS_BOTS__ASSISTANT__WEATHER__API_KEY=... \
//! assistant
//! ```

mod city;
mod commands;
mod config;
mod error;
mod policy;
mod services;

use std::path::PathBuf;

use anyhow::{Context, Result};
use brass::prelude::*;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AssistantConfig;
use crate::services::Services;

/// Name of the `[bots.*]` section this binary reads.
const BOT_SECTION: &str = "assistant";

#[derive(Parser)]
#[command(name = "assistant")]
#[command(about = "LINE assistant bot", long_about = None)]
struct Cli {
    /// Configuration file; searched for in the usual places when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Profile file layered over the main configuration
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the LINE webhook (default)
    Serve,
    /// Push a text message to a user, group or room
    Push {
        /// Target user, group or room id
        #[arg(long)]
        to: String,
        /// Message text
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn build_runtime(cli: &Cli) -> Result<BrassRuntime> {
    let mut builder = BrassRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile.clone());
    }
    builder.build().context("failed to load configuration")
}

async fn serve(mut runtime: BrassRuntime) -> Result<()> {
    let config: AssistantConfig = runtime.bot_config(BOT_SECTION)?;
    let services = Services::new(&config).context("failed to build data clients")?;

    runtime.register_commands(commands::commands(&services));
    info!(commands = runtime.command_count(), "Assistant ready");

    runtime.run().await?;
    Ok(())
}

async fn push(runtime: BrassRuntime, to: String, text: Vec<String>) -> Result<()> {
    let bot = runtime.line_bot()?;
    bot.push(&to, &[text.join(" ")])
        .await
        .with_context(|| format!("failed to push to {to}"))?;
    info!(%to, "Message pushed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = build_runtime(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(runtime).await,
        Commands::Push { to, text } => push(runtime, to, text).await,
    }
}
