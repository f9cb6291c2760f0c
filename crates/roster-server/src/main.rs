//! # Roster Server
//!
//! Main entry point for the Roster server.

#![forbid(unsafe_code)]

use roster_core::Config;
use roster_server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Roster starting...");

    let config = Config::from_env()?;
    tracing::info!(storage = %config.storage.mode, "Configuration loaded");

    Server::new(config).await?.run().await
}
