//! The main application logic, decoupled from the entry point.
//!
//! Wires the store, monitor, alerter, and web server together around one
//! shared shutdown channel. The probe and certificate-checker seams accept
//! overrides so integration tests can substitute fakes.

use crate::api::{self, AppState};
use crate::config::Config;
use crate::core::{CertExpiryChecker, Clock, HttpProber, SystemClock};
use crate::monitor::{Monitor, MonitorSettings};
use crate::notification::Alerter;
use crate::probe::{ReqwestProber, RustlsCertChecker};
use crate::store::Store;
use anyhow::{Context, Result};
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Runs the application until the shutdown signal fires.
pub async fn run(
    config: Config,
    store: Arc<Store>,
    shutdown_rx: watch::Receiver<()>,
    prober_override: Option<Arc<dyn HttpProber>>,
    cert_checker_override: Option<Arc<dyn CertExpiryChecker>>,
) -> Result<()> {
    let config = Arc::new(config);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Seed the store from the config file. Idempotent: endpoints already in
    // the store keep their settings and admin flags.
    store.import_endpoints(&config.endpoints)?;

    let cleanup_task = store.spawn_cleanup_task(shutdown_rx.clone());

    let alerter = Arc::new(Alerter::new(&config.alerting));
    let prober: Arc<dyn HttpProber> =
        prober_override.unwrap_or_else(|| Arc::new(ReqwestProber::new()));
    let cert_checker: Arc<dyn CertExpiryChecker> = cert_checker_override
        .unwrap_or_else(|| Arc::new(RustlsCertChecker::new(Arc::clone(&clock))));

    let monitor = Arc::new(Monitor::new(
        MonitorSettings::from_config(&config),
        Arc::clone(&store),
        alerter,
        prober,
        cert_checker,
        clock,
        shutdown_rx.clone(),
    ));
    monitor.load_from_store()?;
    info!(
        "Monitoring {} endpoints with check interval: {:?}",
        monitor.get_status().len(),
        config.check_interval
    );
    monitor.start();

    let mut server_task = None;
    if config.server.enabled {
        let addr = format!("0.0.0.0:{}", config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind web server to {addr}"))?;
        let state = AppState {
            monitor: Arc::clone(&monitor),
            store: Arc::clone(&store),
            config: Arc::clone(&config),
        };
        let server_shutdown_rx = shutdown_rx.clone();
        server_task = Some(tokio::spawn(async move {
            if let Err(e) = api::serve(listener, state, server_shutdown_rx).await {
                error!("Server error: {e:#}");
            }
        }));
    }

    info!("SiteWatch initialized successfully.");

    let mut shutdown_rx = shutdown_rx;
    shutdown_rx.changed().await.ok();
    info!("Shutting down SiteWatch...");

    monitor.stop().await;
    if let Some(task) = server_task {
        if let Err(e) = task.await {
            error!("Server task panicked: {:?}", e);
        }
    }
    if let Err(e) = cleanup_task.await {
        error!("Cleanup task panicked: {:?}", e);
    }

    info!("Shutdown complete");
    Ok(())
}
