//! shapewire chat client.
//!
//! Prints every broadcast as `username: body` and sends each stdin line to
//! the server. The first line answers the server's username prompt.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use shapewire::transport::{ChatClient, ClientConfig};

#[derive(Debug, Parser)]
#[command(name = "shapewire-client", version, about = "Broadcast chat client")]
struct Cli {
    /// Server address as host:port
    server: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
        EnvFilter::new(format!("shapewire={level},shapewire_client={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
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
    let config = ClientConfig::default().server_addr(cli.server);
    let mut client = ChatClient::connect(config.clone())
        .await
        .with_context(|| format!("failed to connect to {}", config.server_addr))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            message = client.next_message() => match message {
                Some(Ok(message)) => println!("{}: {}", message.username, message.body),
                Some(Err(e)) if e.is_disconnect() => {
                    println!("Disconnected from server");
                    return Ok(());
                }
                Some(Err(e)) => return Err(e).context("failed to read from server"),
                None => return Ok(()),
            },
            line = lines.next_line() => match line.context("failed to read stdin")? {
                Some(line) => client.send_line(&line).await.context("failed to send")?,
                None => return Ok(()),
            },
        }
    }
}
