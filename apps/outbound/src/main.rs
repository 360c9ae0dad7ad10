//! outbound command-line entry point.

mod app;
mod args;
mod config;
mod local;

use clap::Parser;
use outbound_publish::PublishOutcome;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = args::Args::parse();

    // Logs go to stderr; stdout carries the build console.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting outbound");

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(app::run(args))?;

    match outcome {
        PublishOutcome::Success => tracing::info!("publish succeeded"),
        PublishOutcome::Unstable => tracing::warn!("publish finished with errors"),
        PublishOutcome::Failure => {
            tracing::error!("publish failed");
            std::process::exit(1);
        }
    }
    Ok(())
}
