use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::init_logging;
use steadyhand_cli::config::{load_config, LoadedConfig};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    // Logging settings live in the config file, so load it first and
    // report where it came from once the subscriber is installed.
    let LoadedConfig {
        config,
        path,
        from_file,
    } = load_config(cli.config.as_deref()).await?;
    init_logging(&config.logging, cli.log_level.as_deref(), cli.debug)?;

    info!("Starting Steadyhand v{}", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded configuration from: {}", path.display());
    } else {
        warn!("Config file not found, using defaults: {}", path.display());
    }

    let cli_context = CliContext::new(config, path, from_file);
    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
