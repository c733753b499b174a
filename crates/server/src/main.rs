mod bootstrap;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use snapshelf_core::config::{AppConfig, ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "snapshelf",
    about = "Snapshelf album bot server",
    long_about = "Runs the snapshelf chat gateway against the configured album table."
)]
struct Cli {
    #[arg(long, help = "Path to a snapshelf.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, help = "Log level override (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[arg(long, help = "Database url override")]
    database_url: Option<String>,
}

fn init_logging(config: &AppConfig) {
    use snapshelf_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        overrides: ConfigOverrides {
            database_url: cli.database_url,
            log_level: cli.log_level,
            ..ConfigOverrides::default()
        },
    };
    run(options).await
}

async fn run(options: LoadOptions) -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(options)?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        "snapshelf server started"
    );

    app.gateway.start().await?;

    wait_for_shutdown().await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "snapshelf server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
