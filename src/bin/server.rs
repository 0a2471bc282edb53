//! shapewire chat server.
//!
//! Greets each client, asks for a username, then broadcasts every line a
//! client sends to all connected clients.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use shapewire::transport::{Server, ServerConfig, DEFAULT_BROADCAST_CAPACITY};

#[derive(Debug, Parser)]
#[command(name = "shapewire-server", version, about = "Broadcast chat server")]
struct Cli {
    /// Port to listen on
    port: u16,

    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Frames buffered per client before slow clients skip broadcasts
    #[arg(long, default_value_t = DEFAULT_BROADCAST_CAPACITY)]
    broadcast_capacity: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
        EnvFilter::new(format!("shapewire={level},shapewire_server={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ServerConfig::default()
        .bind_addr(format!("{}:{}", cli.bind, cli.port))
        .broadcast_capacity(cli.broadcast_capacity);

    tracing::info!("Starting shapewire server v{}", env!("CARGO_PKG_VERSION"));

    let server = Server::bind(config.clone())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tokio::select! {
        result = server.run() => result.context("accept loop failed"),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
