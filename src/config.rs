//! Application configuration
//!
//! One YAML document with a section per stage of the cycle. Every section
//! falls back to its defaults when omitted.

use std::path::{Path, PathBuf};

use action_gate::VerificationConfig;
use action_locator::ResolverConfig;
use agent_core::{CycleConfig, CycleError, ExecutionConfig, StuckConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use steadyhand_scheduler::SchedulerConfig;
use tokio::fs;

/// Project-local configuration file, checked before the per-user one.
pub const LOCAL_CONFIG_PATH: &str = "config/steadyhand.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of the human formatter
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub resolver: ResolverConfig,
    pub verification: VerificationConfig,
    pub scheduler: SchedulerConfig,
    pub execution: ExecutionConfig,
    pub stuck: StuckConfig,
}

impl Config {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse config file")
    }

    /// Sections consumed by the cycle runner
    pub fn cycle_config(&self) -> CycleConfig {
        CycleConfig {
            resolver: self.resolver.clone(),
            verification: self.verification.clone(),
            scheduler: self.scheduler.clone(),
            execution: self.execution.clone(),
            stuck: self.stuck.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), CycleError> {
        if self.logging.level.trim().is_empty() {
            return Err(CycleError::invalid_config("logging.level must not be empty"));
        }
        self.cycle_config().validate()
    }
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    /// The file at `path` existed and was parsed
    pub from_file: bool,
}

/// Pick the configuration file: explicit path, then the project-local file,
/// then the per-user config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG_PATH);
    if local.exists() {
        return Ok(local);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("steadyhand");
    path.push("config.yaml");
    Ok(path)
}

pub async fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = resolve_config_path(explicit)?;
    load_config_from(&path).await
}

/// Read `path`, or fall back to defaults when it does not exist.
///
/// Nothing is logged here: the subscriber is configured from the result,
/// so callers report `from_file` once logging is up.
pub async fn load_config_from(path: &Path) -> Result<LoadedConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(LoadedConfig {
            config: Config::default(),
            path: path.to_path_buf(),
            from_file: false,
        });
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let config = Config::from_yaml(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(LoadedConfig {
        config,
        path: path.to_path_buf(),
        from_file: true,
    })
}
