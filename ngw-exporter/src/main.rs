//! Prometheus exporter for Nokia FastMile 5G gateways.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use ngw_exporter::{DeviceClient, ExporterConfig, HttpServer, Registry, enabled_collectors};

/// Prometheus exporter for Nokia FastMile 5G gateways.
#[derive(Parser, Debug)]
#[command(name = "ngw-exporter")]
#[command(about = "Export Nokia 5G gateway statistics as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// Gateway address, host or host:port (overrides config).
    #[arg(short, long)]
    target: Option<String>,

    /// HTTP listen address, `host:port` or `:port` for all interfaces (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Timeout for each device request in seconds (overrides config).
    #[arg(long)]
    scrape_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error) (overrides config).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // Command-line overrides
    if let Some(target) = args.target {
        config.device.target = target;
    }
    if let Some(listen) = args.listen {
        config.exporter.listen = listen;
    }
    if let Some(timeout) = args.scrape_timeout_secs {
        config.device.scrape_timeout_secs = timeout;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    config.validate()?;
    let listen_addr = config.listen_addr()?;

    ngw_common::init_tracing(&config.logging)?;

    info!(
        target_device = %config.device.target,
        timeout_secs = config.device.scrape_timeout_secs,
        "Starting gateway exporter"
    );

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client = DeviceClient::new(config.device.target.clone(), config.device.scrape_timeout());

    let mut registry = Registry::new();
    for collector in enabled_collectors(&client, &config.collectors) {
        registry.register(collector)?;
    }
    let registry = Arc::new(registry);

    let http_server = HttpServer::new(
        registry.clone(),
        listen_addr,
        config.exporter.path.clone(),
        config.exporter.error_handling,
    );

    // Start HTTP server
    let mut http_task = tokio::spawn(http_server.run(shutdown_rx));

    // Wait for shutdown signal, or for the server to give up on its own
    let exited = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            None
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
            None
        }
        result = &mut http_task => Some(result),
    };

    if let Some(result) = exited {
        let error = match result {
            Ok(Ok(())) => anyhow::anyhow!("HTTP server stopped unexpectedly"),
            Ok(Err(e)) => e,
            Err(e) => anyhow::anyhow!("HTTP server task failed: {}", e),
        };
        error!("{:#}", error);
        return Err(error);
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for the server to drain
    match tokio::time::timeout(Duration::from_secs(5), http_task).await {
        Ok(Ok(Err(e))) => error!("HTTP server error: {}", e),
        Ok(_) => {}
        Err(_) => warn!("HTTP server did not stop in time"),
    }

    info!(collectors = registry.len(), "Exporter stopped");
    Ok(())
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
