mod commands;
mod config;
mod error;
mod protocol;
mod read;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Source connector emitting synthetic user/segment membership events.
#[derive(Parser)]
#[command(name = "event-generator", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the connector specification
    Spec,
    /// Validate a configuration file
    Check {
        #[arg(long)]
        config: PathBuf,
    },
    /// Print the catalog of streams
    Discover {
        #[arg(long)]
        config: PathBuf,
    },
    /// Emit events, tailing if the catalog asks for it
    Read {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        catalog: PathBuf,
        /// Checkpoint to resume the cursor from
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout carries protocol messages; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let stdout = std::io::stdout();

    match args.command {
        Command::Spec => commands::spec(stdout.lock())?,
        Command::Check { config } => commands::check(&config, stdout.lock())?,
        Command::Discover { config } => commands::discover(&config, stdout.lock())?,
        Command::Read {
            config,
            catalog,
            state,
        } => {
            let shutdown = CancellationToken::new();
            let signal_token = shutdown.clone();
            tokio::spawn(async move {
                shutdown_signal(signal_token).await;
            });

            commands::read(&config, &catalog, state.as_deref(), stdout, &shutdown).await?;
        }
    }
    Ok(())
}

/// Listen for SIGINT (Ctrl+C) or SIGTERM and cancel the shutdown token.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await.ok();
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    tracing::info!("shutdown signal received, stopping read");
    token.cancel();
}
