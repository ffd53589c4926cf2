//! Headless tape library simulator.
//!
//! Run with: `cargo run --package tapelib-sim -- [config-file]`
//!
//! Commands are read from stdin, responses written to stdout, logs to stderr.
//! Set `RUST_LOG=debug` to see every task step.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tapelib_sim::build_simulator;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let cwd = std::env::current_dir().context("reading working directory")?;
    let mut simulator = build_simulator(config_path.as_deref(), &cwd)
        .context("failed to start the simulator")?;

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let summary = simulator
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), shutdown)
        .await?;
    tracing::info!(ticks = summary.ticks, "bye");
    Ok(())
}
