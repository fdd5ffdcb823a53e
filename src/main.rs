//! Steadyhand - verified, one-step-at-a-time form automation

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::app::run().await
}
