//! SiteWatch - Endpoint Health and TLS Certificate Monitor
//!
//! Probes a fleet of HTTP(S) endpoints, tracks health under hysteresis
//! thresholds, watches certificate expiry on a daily cadence, and dispatches
//! alerts to chat, email, and webhook sinks.

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use sitewatch::app;
use sitewatch::cli::Cli;
use sitewatch::config::Config;
use sitewatch::core::{Clock, SystemClock};
use sitewatch::store::Store;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first so the log level can come from it.
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            env_logger::init();
            error!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.log_level),
    )
    .init();

    info!("Starting SiteWatch...");
    info!("Using database at {}", cli.db.display());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = match Store::open(&cli.db, clock) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database initialized successfully");

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    app::run(config, store, shutdown_rx, None, None).await
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
