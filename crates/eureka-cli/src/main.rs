use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use eureka_cli::commands;
use eureka_cli::{Cli, Commands, Config};
use eureka_feed::WebSocketConnector;

/// Load and validate config, applying a command-line endpoint override.
fn load_config(config_path: Option<&Path>, url: Option<&str>) -> Result<Config> {
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    if let Some(url) = url {
        config.stream.url = url.to_string();
    }
    config.validate()?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries the tally
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Watch { url, color }) => {
            let mut config = load_config(cli.config.as_deref(), url.as_deref())?;
            if *color {
                // An explicit flag wins over terminal detection
                colored::control::set_override(true);
                config.display.color = true;
            }
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            let mut stdout = std::io::stdout().lock();
            let result = runtime.block_on(async {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                commands::watch::run(&mut stdout, &config, WebSocketConnector, stdin, ctrl_c())
                    .await
            });
            // A blocked stdin read would otherwise hold the process open.
            runtime.shutdown_background();
            result?;
        }
        Some(Commands::Config) => {
            let config = load_config(cli.config.as_deref(), None)?;
            commands::config::run(&mut std::io::stdout().lock(), &config)?;
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
