use anyhow::{Context, Result};
use clap::Parser;
use snip_core::SnippetConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;
mod paths;
mod snippet_cli;

use snippet_cli::SnippetCommands;

#[derive(Parser)]
#[command(name = "snipstr")]
#[command(about = "Search, list and publish code snippets on Nostr")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: SnippetCommands,

    /// Configuration file path (default: ~/.config/snipstr/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level: error, warn, info, debug, trace (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = paths::config_path(cli.config.as_deref())?;
    let config = SnippetConfig::load_from_file(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level))?;
    tracing::debug!("Configuration loaded from {}", path.display());

    config
        .validate()
        .with_context(|| "Configuration validation failed")?;

    snippet_cli::handle_command(cli.command, &config, cli.json).await
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_logging(level: &str) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter.to_string())),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
