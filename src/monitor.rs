//! Monitor core: the endpoint state table, the tick scheduler, the
//! hysteresis state machine, the daily SSL-summary scheduler, and the admin
//! mutation surface.
//!
//! Locking discipline: the table lock guards only structural changes
//! (insert/remove/iterate); each endpoint has its own `RwLock` around its
//! state. No state lock is ever held across probe I/O: probe tasks snapshot
//! configuration, release, perform I/O, then reacquire to commit, checking
//! first that the endpoint still exists.

use crate::config::Config;
use crate::core::{
    AlertEdge, CertExpiryChecker, Clock, EndpointState, HealthCheckRecord, HealthStatus,
    HttpProber, ProbeOutcome, ProbeRequest, SslCertInfo, StoredEndpoint,
};
use crate::notification::{Alerter, SslExpiryInfo};
use crate::store::{Store, StoreError};
use crate::utils::time::{format_report_time, reporting_zone};
use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Monitor error types surfaced to the admin API.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("endpoint not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for MonitorError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => MonitorError::NotFound(id),
            other => MonitorError::Store(other),
        }
    }
}

/// Tunables the monitor takes from the application config.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Fallback probe interval for endpoints that do not set their own.
    pub default_check_interval: Duration,
    pub ssl_expiry_warning_days: u32,
    /// HH:MM in the reporting timezone.
    pub ssl_summary_time: String,
    /// Cadence of the grouped health report; zero disables it.
    pub health_summary_interval: Duration,
    /// How often the scheduler looks for due endpoints.
    pub tick_interval: Duration,
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_check_interval: config.check_interval,
            ssl_expiry_warning_days: config.ssl_expiry_warning_days,
            ssl_summary_time: config.ssl_summary_time.clone(),
            health_summary_interval: config.health_summary_interval,
            tick_interval: Duration::from_secs(5),
        }
    }
}

type EndpointCell = RwLock<EndpointState>;

/// Owns the live endpoint state table and all monitoring tasks.
pub struct Monitor {
    settings: MonitorSettings,
    store: Arc<Store>,
    alerter: Arc<Alerter>,
    prober: Arc<dyn HttpProber>,
    cert_checker: Arc<dyn CertExpiryChecker>,
    clock: Arc<dyn Clock>,
    states: RwLock<HashMap<String, Arc<EndpointCell>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    probe_tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_rx: watch::Receiver<()>,
}

impl Monitor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: MonitorSettings,
        store: Arc<Store>,
        alerter: Arc<Alerter>,
        prober: Arc<dyn HttpProber>,
        cert_checker: Arc<dyn CertExpiryChecker>,
        clock: Arc<dyn Clock>,
        shutdown_rx: watch::Receiver<()>,
    ) -> Self {
        Self {
            settings,
            store,
            alerter,
            prober,
            cert_checker,
            clock,
            states: RwLock::new(HashMap::new()),
            tasks: Mutex::new(Vec::new()),
            probe_tasks: Mutex::new(Vec::new()),
            shutdown_rx,
        }
    }

    /// Rebuilds the state table from the store. Every endpoint starts
    /// `unknown` with its first check due immediately.
    pub fn load_from_store(&self) -> Result<(), MonitorError> {
        let endpoints = self.store.list_endpoints()?;
        let now = self.clock.now();

        let mut states = self.states.write().unwrap();
        states.clear();
        for stored in &endpoints {
            states.insert(
                stored.id.clone(),
                Arc::new(RwLock::new(EndpointState::from_stored(
                    stored,
                    now,
                    self.settings.default_check_interval,
                ))),
            );
        }
        info!("Loaded {} endpoints from store", states.len());
        Ok(())
    }

    // --- Admin operations -------------------------------------------------
    //
    // Every mutation writes the store first; the in-memory table changes
    // only after the write commits.

    pub fn add_endpoint(&self, stored: &mut StoredEndpoint) -> Result<(), MonitorError> {
        self.store.put_endpoint(stored)?;

        let now = self.clock.now();
        let state = EndpointState::from_stored(stored, now, self.settings.default_check_interval);
        self.states
            .write()
            .unwrap()
            .insert(stored.id.clone(), Arc::new(RwLock::new(state)));

        info!("Added endpoint: {}", stored.name);
        Ok(())
    }

    pub fn remove_endpoint(&self, id: &str) -> Result<(), MonitorError> {
        self.store.delete_endpoint(id)?;
        self.states.write().unwrap().remove(id);
        info!("Removed endpoint: {}", id);
        Ok(())
    }

    pub fn enable_endpoint(&self, id: &str) -> Result<(), MonitorError> {
        self.set_enabled(id, true)
    }

    pub fn disable_endpoint(&self, id: &str) -> Result<(), MonitorError> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), MonitorError> {
        let mut stored = self.store.get_endpoint(id)?;
        stored.enabled = enabled;
        self.store.put_endpoint(&mut stored)?;

        if let Some(cell) = self.states.read().unwrap().get(id) {
            cell.write().unwrap().enabled = enabled;
        }
        info!(
            "{} endpoint: {}",
            if enabled { "Enabled" } else { "Disabled" },
            id
        );
        Ok(())
    }

    pub fn suppress_alerts(&self, id: &str) -> Result<(), MonitorError> {
        self.set_alerts_suppressed(id, true)
    }

    pub fn unsuppress_alerts(&self, id: &str) -> Result<(), MonitorError> {
        self.set_alerts_suppressed(id, false)
    }

    fn set_alerts_suppressed(&self, id: &str, suppressed: bool) -> Result<(), MonitorError> {
        let mut stored = self.store.get_endpoint(id)?;
        stored.alerts_suppressed = suppressed;
        self.store.put_endpoint(&mut stored)?;

        if let Some(cell) = self.states.read().unwrap().get(id) {
            cell.write().unwrap().alerts_suppressed = suppressed;
        }
        info!(
            "{} alerts for endpoint: {}",
            if suppressed { "Suppressed" } else { "Unsuppressed" },
            id
        );
        Ok(())
    }

    /// Replaces an endpoint's probe settings. Hysteresis counters and the
    /// current status are preserved.
    pub fn update_endpoint_settings(
        &self,
        id: &str,
        updated: &mut StoredEndpoint,
    ) -> Result<(), MonitorError> {
        self.store.put_endpoint(updated)?;

        if let Some(cell) = self.states.read().unwrap().get(id) {
            let mut state = cell.write().unwrap();
            state.timeout = updated.timeout;
            state.failure_threshold = updated.failure_threshold;
            state.success_threshold = updated.success_threshold;
            state.check_interval = if updated.check_interval.is_zero() && updated.monitor_health {
                self.settings.default_check_interval
            } else {
                updated.check_interval
            };
            info!("Updated endpoint settings: {}", id);
        }
        Ok(())
    }

    /// Turns on health monitoring for a (previously SSL-only) endpoint and
    /// pulls its next check forward to now.
    pub fn enable_health_monitoring(
        &self,
        id: &str,
        updated: &mut StoredEndpoint,
    ) -> Result<(), MonitorError> {
        updated.monitor_health = true;
        self.store.put_endpoint(updated)?;

        if let Some(cell) = self.states.read().unwrap().get(id) {
            let mut state = cell.write().unwrap();
            state.monitor_health = true;
            state.timeout = updated.timeout;
            state.expected_status = updated.expected_status;
            state.failure_threshold = updated.failure_threshold;
            state.success_threshold = updated.success_threshold;
            state.check_interval = if updated.check_interval.is_zero() {
                self.settings.default_check_interval
            } else {
                updated.check_interval
            };
            state.next_check = self.clock.now();
            info!("Enabled health monitoring for endpoint: {}", id);
        }
        Ok(())
    }

    /// Forces a TLS re-probe of every enabled HTTPS endpoint on the next
    /// tick. Returns how many endpoints were scheduled.
    pub fn trigger_ssl_recheck(&self) -> usize {
        let now = self.clock.now();
        let states = self.states.read().unwrap();

        let mut count = 0;
        for cell in states.values() {
            let mut state = cell.write().unwrap();
            if state.enabled && state.url.starts_with("https://") {
                state.last_ssl_check = None;
                state.next_check = now;
                count += 1;
            }
        }
        info!("SSL recheck scheduled for {} endpoints", count);
        count
    }

    /// Snapshot of every endpoint's current state.
    pub fn get_status(&self) -> Vec<EndpointState> {
        let states = self.states.read().unwrap();
        states
            .values()
            .map(|cell| cell.read().unwrap().clone())
            .collect()
    }

    /// Snapshot of the currently unhealthy endpoints.
    pub fn unhealthy_states(&self) -> Vec<EndpointState> {
        self.get_status()
            .into_iter()
            .filter(|s| s.status == HealthStatus::Unhealthy)
            .collect()
    }

    /// Endpoints whose certificate is inside the warning window, most
    /// urgent first.
    pub fn expiring_certificates(&self) -> Vec<SslExpiryInfo> {
        let mut expiring: Vec<SslExpiryInfo> = self
            .get_status()
            .into_iter()
            .filter(|s| s.ssl_expiring_soon)
            .filter_map(|s| {
                s.ssl_cert_expiry.map(|expiry| SslExpiryInfo {
                    endpoint_name: s.name,
                    url: s.url,
                    expiry_date: expiry,
                    days_to_expiry: s.days_to_expiry,
                })
            })
            .collect();
        expiring.sort_by_key(|c| c.days_to_expiry);
        expiring
    }

    // --- Scheduling -------------------------------------------------------

    /// Starts the tick scheduler, the daily SSL-summary task, and (when
    /// configured) the grouped health report task. An initial sweep probes
    /// every enabled endpoint immediately.
    pub fn start(self: &Arc<Self>) {
        self.dispatch_probes(true);

        let monitor = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_rx.clone();
        let tick_interval = self.settings.tick_interval;
        let tick_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            // The initial sweep already ran; skip the interval's immediate tick.
            ticker.tick().await;
            let mut ticks: u64 = 0;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        info!("Tick scheduler received shutdown signal.");
                        break;
                    }
                    _ = ticker.tick() => {
                        let started = tokio::time::Instant::now();
                        monitor.dispatch_probes(false);
                        ticks += 1;
                        // Periodic liveness line, plus a warning when a
                        // dispatch pass itself eats into the tick budget.
                        let spent = started.elapsed();
                        if spent > tick_interval / 2 {
                            warn!("Probe dispatch took {:?} of a {:?} tick", spent, tick_interval);
                        }
                        if ticks % 60 == 0 {
                            debug!(
                                "Tick scheduler alive: {} ticks, {} endpoints tracked",
                                ticks,
                                monitor.states.read().unwrap().len()
                            );
                        }
                    }
                }
            }
        });

        let monitor = Arc::clone(self);
        let summary_task = tokio::spawn(async move { monitor.run_ssl_summary_scheduler().await });

        let mut tasks = self.tasks.lock().unwrap();
        tasks.push(tick_task);
        tasks.push(summary_task);

        if !self.settings.health_summary_interval.is_zero() {
            let monitor = Arc::clone(self);
            tasks.push(tokio::spawn(async move {
                monitor.run_health_summary_loop().await;
            }));
        }
    }

    /// Waits for the long-lived tasks and all in-flight probes to finish.
    /// Callers signal shutdown through the shared watch channel first.
    pub async fn stop(&self) {
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().unwrap().drain(..).collect();
        let probes: Vec<JoinHandle<()>> = self.probe_tasks.lock().unwrap().drain(..).collect();
        info!(
            "Monitor stopping: waiting for {} task(s) and {} in-flight probe(s)",
            tasks.len(),
            probes.len()
        );

        for result in futures::future::join_all(tasks.into_iter().chain(probes)).await {
            if let Err(e) = result {
                error!("Monitor task panicked: {:?}", e);
            }
        }
        info!("Monitor stopped.");
    }

    /// Spawns a probe task for each endpoint that is due (or for every
    /// enabled endpoint when `include_not_due` is set, as in the startup
    /// sweep). `next_check` advances *before* the task spawns, so at most
    /// one probe per endpoint is ever outstanding.
    fn dispatch_probes(self: &Arc<Self>, include_not_due: bool) {
        let now = self.clock.now();

        let snapshot: Vec<(String, Arc<EndpointCell>)> = {
            let states = self.states.read().unwrap();
            states
                .iter()
                .map(|(id, cell)| (id.clone(), Arc::clone(cell)))
                .collect()
        };

        let mut due = Vec::new();
        for (id, cell) in snapshot {
            {
                let mut state = cell.write().unwrap();
                if !state.enabled {
                    continue;
                }
                if !include_not_due && now < state.next_check {
                    continue;
                }
                state.next_check = now + probe_interval(&state);
            }
            due.push((id, cell));
        }

        if due.is_empty() {
            return;
        }
        debug!("Dispatching {} probe(s)", due.len());

        let mut probe_tasks = self.probe_tasks.lock().unwrap();
        probe_tasks.retain(|handle| !handle.is_finished());
        for (id, cell) in due {
            let monitor = Arc::clone(self);
            probe_tasks.push(tokio::spawn(async move {
                monitor.probe_endpoint(id, cell).await;
            }));
        }
    }

    async fn probe_endpoint(self: Arc<Self>, id: String, cell: Arc<EndpointCell>) {
        let snapshot = { cell.read().unwrap().clone() };

        if !snapshot.monitor_health {
            self.probe_ssl_only(&id, &snapshot).await;
            return;
        }

        let request = ProbeRequest {
            url: snapshot.url.clone(),
            method: snapshot.method.clone(),
            headers: snapshot.headers.clone(),
            timeout: snapshot.timeout,
        };

        let mut shutdown_rx = self.shutdown_rx.clone();
        let outcome = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                debug!("Probe for {} cancelled by shutdown", id);
                return;
            }
            outcome = self.prober.probe(&request) => outcome,
        };

        let (is_success, error_msg, elapsed, status_code) = match outcome {
            ProbeOutcome::Success { status, elapsed } if status == snapshot.expected_status => {
                (true, String::new(), elapsed, Some(status))
            }
            ProbeOutcome::Success { status, elapsed } => (
                false,
                format!(
                    "unexpected status code: got {}, expected {}",
                    status, snapshot.expected_status
                ),
                elapsed,
                Some(status),
            ),
            ProbeOutcome::Failure { error, elapsed } => (false, error, elapsed, None),
        };

        // TLS runs on the success path only, at most once per day.
        let ssl_info = if is_success && snapshot.ssl_check_due(self.clock.now()) {
            Some(
                self.cert_checker
                    .check(&snapshot.url, self.settings.ssl_expiry_warning_days)
                    .await,
            )
        } else {
            None
        };

        self.commit_health_outcome(&id, is_success, error_msg, elapsed, status_code, ssl_info);
    }

    /// SSL-only endpoints skip HTTP entirely and live on a 24-hour cadence.
    async fn probe_ssl_only(&self, id: &str, snapshot: &EndpointState) {
        let ssl_info = if snapshot.ssl_check_due(self.clock.now()) {
            Some(
                self.cert_checker
                    .check(&snapshot.url, self.settings.ssl_expiry_warning_days)
                    .await,
            )
        } else {
            None
        };

        let Some(cell) = self.states.read().unwrap().get(id).cloned() else {
            debug!("Dropping SSL result for removed endpoint {}", id);
            return;
        };

        let now = self.clock.now();
        let mut state = cell.write().unwrap();
        state.last_check = Some(now);
        state.next_check = now + chrono::Duration::hours(24);
        if let Some(info) = ssl_info {
            apply_ssl_info(&mut state, info, now);
        }
    }

    /// Commits a probe outcome: hysteresis update, TLS fields, the history
    /// record, and the alert edge if one was crossed. The state write lock
    /// covers the counter update and the history write so records land in
    /// transition order; alert dispatch happens after the lock is released.
    fn commit_health_outcome(
        &self,
        id: &str,
        is_success: bool,
        error_msg: String,
        elapsed: Duration,
        status_code: Option<u16>,
        ssl_info: Option<SslCertInfo>,
    ) {
        // The endpoint may have been removed while the probe was in flight.
        let Some(cell) = self.states.read().unwrap().get(id).cloned() else {
            debug!("Dropping probe result for removed endpoint {}", id);
            return;
        };

        let now = self.clock.now();
        let mut state = cell.write().unwrap();

        let edge = if is_success {
            metrics::counter!("probe_successes").increment(1);
            let edge = state.apply_success(now, elapsed);
            info!(
                "[{}] ✓ Health check passed (status: {}, response time: {:?})",
                state.name, state.status, elapsed
            );
            edge
        } else {
            metrics::counter!("probe_failures").increment(1);
            let edge = state.apply_failure(now, error_msg.clone(), elapsed);
            info!(
                "[{}] ✗ Health check failed (status: {}, error: {})",
                state.name, state.status, error_msg
            );
            edge
        };

        if let Some(info) = ssl_info {
            apply_ssl_info(&mut state, info, now);
        }

        let record = HealthCheckRecord {
            endpoint_id: id.to_string(),
            timestamp: now,
            status: state.status,
            response_time: elapsed,
            status_code,
            error: error_msg,
        };
        if let Err(e) = self.store.append_record(&record) {
            error!("Error saving health check record: {}", e);
        }

        let snapshot = state.clone();
        drop(state);

        if let Some(edge) = edge {
            if !snapshot.alerts_suppressed {
                match edge {
                    AlertEdge::Failure => self.alerter.send_failure_alert(&snapshot, now),
                    AlertEdge::Recovery => self.alerter.send_recovery_alert(&snapshot, now),
                }
            }
        }
    }

    // --- Background loops -------------------------------------------------

    async fn run_ssl_summary_scheduler(self: Arc<Self>) {
        let zone = reporting_zone();
        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            // Recompute the target every cycle rather than adding 24h blindly,
            // so clock adjustments cannot drift the schedule.
            let now = self.clock.now();
            let delay = next_summary_delay(now, &self.settings.ssl_summary_time, zone);
            info!(
                "Next SSL expiry summary scheduled at: {} (in {:?})",
                format_report_time(
                    now + chrono::Duration::from_std(delay)
                        .unwrap_or_else(|_| chrono::Duration::zero())
                ),
                delay
            );

            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("SSL summary scheduler received shutdown signal.");
                    return;
                }
                _ = tokio::time::sleep(delay) => {
                    let expiring = self.expiring_certificates();
                    if expiring.is_empty() {
                        info!("No expiring SSL certificates to report in daily summary");
                    } else {
                        info!("Sending SSL expiry summary for {} certificates", expiring.len());
                        self.alerter.send_ssl_expiry_summary(expiring).await;
                    }
                }
            }
        }
    }

    async fn run_health_summary_loop(self: Arc<Self>) {
        let interval = self.settings.health_summary_interval;
        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut ticker = tokio::time::interval(interval);
        // The first report goes out one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("Health summary loop received shutdown signal.");
                    return;
                }
                _ = ticker.tick() => {
                    let unhealthy = self.unhealthy_states();
                    self.alerter
                        .send_grouped_health_alert(interval, self.clock.now(), unhealthy)
                        .await;
                }
            }
        }
    }
}

/// How far `next_check` advances when a probe is dispatched.
fn probe_interval(state: &EndpointState) -> chrono::Duration {
    if state.monitor_health {
        chrono::Duration::from_std(state.check_interval)
            .unwrap_or_else(|_| chrono::Duration::seconds(30))
    } else {
        chrono::Duration::hours(24)
    }
}

/// Folds a TLS probe result into the state. A failed probe leaves every TLS
/// field (including `last_ssl_check`) untouched: zeroed expiry carries no
/// information and must not clobber known values.
fn apply_ssl_info(state: &mut EndpointState, info: SslCertInfo, now: DateTime<Utc>) {
    if !info.is_https {
        return;
    }
    if let Some(err) = info.error {
        warn!("[{}] SSL certificate check failed: {}", state.name, err);
        return;
    }

    state.ssl_cert_expiry = info.expiry;
    state.days_to_expiry = info.days_to_expiry;
    state.ssl_expiring_soon = info.expiring_soon;
    state.last_ssl_check = Some(now);

    if info.expiring_soon {
        info!(
            "[{}] ⚠️  SSL certificate expiring in {} days",
            state.name, info.days_to_expiry
        );
    }
    if let Some(expiry) = info.expiry {
        info!(
            "[{}] SSL certificate validated (expires: {}, days remaining: {})",
            state.name,
            expiry.format("%Y-%m-%d"),
            info.days_to_expiry
        );
    }
}

/// Computes the delay until the next occurrence of `summary_time` (HH:MM) in
/// the given zone. Falls back to 09:30 on an unparsable time.
pub fn next_summary_delay(
    now: DateTime<Utc>,
    summary_time: &str,
    zone: FixedOffset,
) -> Duration {
    let (hour, minute) = parse_summary_time(summary_time).unwrap_or_else(|| {
        error!(
            "Invalid SSL summary time format '{}', using default 09:30",
            summary_time
        );
        (9, 30)
    });

    let local = now.with_timezone(&zone);
    let today = local
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .expect("validated wall-clock time");
    let mut next = today
        .and_local_timezone(zone)
        .single()
        .expect("fixed offsets are unambiguous");
    if local > next {
        next += chrono::Duration::hours(24);
    }

    (next - local).to_std().unwrap_or_default()
}

fn parse_summary_time(s: &str) -> Option<(u32, u32)> {
    let (hour, minute) = s.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ist() -> FixedOffset {
        reporting_zone()
    }

    fn at_ist(hour: u32, minute: u32) -> DateTime<Utc> {
        // 08:00 IST == 02:30 UTC.
        ist()
            .with_ymd_and_hms(2026, 6, 10, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn fire_later_today_when_before_summary_time() {
        let delay = next_summary_delay(at_ist(8, 0), "09:30", ist());
        assert_eq!(delay, Duration::from_secs(90 * 60));
    }

    #[test]
    fn fire_tomorrow_when_past_summary_time() {
        let delay = next_summary_delay(at_ist(10, 0), "09:30", ist());
        assert_eq!(delay, Duration::from_secs((23 * 60 + 30) * 60));
    }

    #[test]
    fn fire_immediately_at_exact_summary_time() {
        let delay = next_summary_delay(at_ist(9, 30), "09:30", ist());
        assert_eq!(delay, Duration::ZERO);
    }

    #[test]
    fn invalid_time_falls_back_to_default() {
        let delay = next_summary_delay(at_ist(8, 0), "not-a-time", ist());
        assert_eq!(delay, Duration::from_secs(90 * 60));
    }

    #[test]
    fn single_digit_hours_accepted() {
        let delay = next_summary_delay(at_ist(8, 0), "9:30", ist());
        assert_eq!(delay, Duration::from_secs(90 * 60));
    }

    #[test]
    fn out_of_range_time_rejected() {
        assert_eq!(parse_summary_time("24:00"), None);
        assert_eq!(parse_summary_time("09:60"), None);
        assert_eq!(parse_summary_time("0930"), None);
        assert_eq!(parse_summary_time("09:30"), Some((9, 30)));
    }
}
