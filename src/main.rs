//! tileguard daemon entry point.

use tileguard::config::Config;
use tileguard::server::Server;
use tileguard::{metrics, telemetry};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tileguard.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        eprintln!("failed to load {config_path}: {e}");
        e
    })?;

    telemetry::init(&config.logging);
    metrics::init();

    info!(
        path = %config_path,
        instances = config.instances.len(),
        "Starting tileguard"
    );

    let server = Server::start(&config)?;
    for name in server.instance_names() {
        info!(instance = %name, "Accepting connections");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown requested");
    server.shutdown().await;
    debug!(metrics = %metrics::gather_metrics(), "Final metrics snapshot");
    Ok(())
}
