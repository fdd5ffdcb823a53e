use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Validate the effective configuration
    Validate,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let config = ctx.config();
    match args.action {
        ConfigAction::Show => match output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(config)?),
            OutputFormat::Human => {
                if ctx.from_file() {
                    println!("Current configuration ({}):", ctx.config_path().display());
                } else {
                    println!(
                        "No configuration file at {}; showing defaults:",
                        ctx.config_path().display()
                    );
                }
                print!("{}", serde_yaml::to_string(config)?);
            }
        },
        ConfigAction::Validate => {
            config
                .validate()
                .with_context(|| format!("validating {}", ctx.config_path().display()))?;
            if ctx.from_file() {
                println!("Configuration file {} is valid", ctx.config_path().display());
            } else {
                println!(
                    "No configuration file at {}; defaults are valid",
                    ctx.config_path().display()
                );
            }
        }
    }

    Ok(())
}
