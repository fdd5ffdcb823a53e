use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use steadyhand_cli::{run_scenario, Scenario};

use crate::cli::context::CliContext;
use crate::cli::output::{render_report, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Scenario file (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub scenario: PathBuf,

    /// Exit with an error when any cycle fails
    #[arg(long)]
    pub strict: bool,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let scenario = Scenario::load(&args.scenario).await?;
    let report = run_scenario(&scenario, ctx.config()).await?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Human => print!("{}", render_report(&report)),
    }

    if args.strict && !report.is_success() {
        bail!("scenario {} did not complete successfully", report.name);
    }
    Ok(())
}
