use anyhow::{Context, Result};
use steadyhand_cli::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` wins over `level`; `debug`
/// wins over both.
pub fn init_logging(logging: &LoggingConfig, level: Option<&str>, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level
            .unwrap_or(&logging.level)
            .parse()
            .context("Invalid log level")?
    };

    let filter = if debug {
        tracing_subscriber::EnvFilter::new(level.to_string())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to install JSON logger")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to install logger")?;
    }

    Ok(())
}
