// Standalone relay entry point.
//
// Loads config/fpl-live.toml, binds the relay on [relay].bind:[relay].port,
// and serves until Ctrl+C.

use std::sync::Arc;

use anyhow::Context;
use fpl_live_core::config;
use fpl_live_relay::{Relay, RelayServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fpl_live=info,warn")),
        )
        .with_target(true)
        .init();

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Forwarding {} to {}",
        config.relay.route, config.upstream.base_url
    );

    let relay = Relay::from_config(&config).context("failed to build relay")?;
    let addr = format!("{}:{}", config.relay.bind, config.relay.port);
    let handle = RelayServer::bind(&addr)
        .context("failed to start relay")?
        .spawn(Arc::new(relay));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Shutting down");
    handle.shutdown().await;
    Ok(())
}
