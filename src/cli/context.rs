use std::path::{Path, PathBuf};

use steadyhand_cli::Config;

pub struct CliContext {
    config: Config,
    config_path: PathBuf,
    from_file: bool,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf, from_file: bool) -> Self {
        Self {
            config,
            config_path,
            from_file,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Configuration came from `config_path` rather than defaults
    pub fn from_file(&self) -> bool {
        self.from_file
    }
}
