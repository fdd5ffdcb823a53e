use clap::Subcommand;

use super::config::ConfigArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run a scripted scenario through the cycle runner
    Run(RunArgs),

    /// Inspect Steadyhand configuration
    Config(ConfigArgs),
}
