//! TCP Chat Relay - Entry Point
//!
//! Parses configuration, binds the listener, and relays until Ctrl-C.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_relay::{Config, Relay};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    let config = Config::parse();
    let listen = config.listen;

    let relay = match Relay::bind(config).await {
        Ok(relay) => relay,
        Err(e) => {
            error!("Failed to listen on {}: {}", listen, e);
            return Err(e.into());
        }
    };

    info!("Chat relay listening on {}", relay.local_addr()?);

    relay.run_until_ctrl_c().await;

    Ok(())
}
