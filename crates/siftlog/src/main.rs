//! Siftlog CLI binary.

use anyhow::Result;
use siftlog::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the siftlog CLI.
///
/// A query is a single read followed by in-memory work, so the
/// current-thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    // Example: RUST_LOG=siftlog=debug,siftlog_log=trace siftlog --store records.log
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("siftlog=warn,siftlog_log=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting siftlog CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Siftlog CLI completed successfully");
    Ok(())
}
