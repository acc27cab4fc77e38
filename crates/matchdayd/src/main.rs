//! matchdayd — the Matchday daemon.
//!
//! Single binary that assembles the fixture engine subsystems:
//! - State store (redb)
//! - REST API (group allocation + fixture generation + registry)
//!
//! # Usage
//!
//! ```text
//! matchdayd standalone --port 8080 --data-dir /var/lib/matchday
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "matchdayd", about = "Matchday fixture engine daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the API server as a single-node process.
    Standalone {
        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Data directory for persistent state.
        #[arg(long, default_value = "/var/lib/matchday")]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,matchdayd=debug,matchday=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Standalone { port, data_dir } => run_standalone(port, data_dir).await,
    }
}

async fn run_standalone(port: u16, data_dir: PathBuf) -> anyhow::Result<()> {
    info!("Matchday daemon starting in standalone mode");

    // Ensure data directory exists.
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("matchday.redb");

    let state = matchday_state::StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let router = matchday_api::build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
    });

    server.await?;

    info!("Matchday daemon stopped");
    Ok(())
}
