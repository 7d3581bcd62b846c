//! Chat server binary.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chat_server::{Config, Server};

#[derive(Parser)]
#[clap(name = "chat-server")]
#[clap(about = "Multi-user chat directory server")]
struct Cli {
    /// Address to bind (overrides CHAT_BIND_ADDR)
    #[clap(short, long)]
    bind: Option<String>,

    /// Port to listen on (overrides CHAT_PORT)
    #[clap(short, long)]
    port: Option<u16>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.bind, cli.port);

    info!(
        "starting chat-server on {} (max_clients = {})",
        config.socket_addr_string(),
        config.max_clients
    );

    let server = Server::bind(config.clone())
        .await
        .with_context(|| format!("can't bind {} to listen", config.socket_addr_string()))?;

    server
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to install ctrl-c handler");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
