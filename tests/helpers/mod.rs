//! Shared test doubles: a manual clock, scripted/blocking probers, and a
//! fake certificate checker.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sitewatch::core::{
    CertExpiryChecker, Clock, HttpProber, ProbeOutcome, ProbeRequest, SslCertInfo,
};
use sitewatch::monitor::MonitorSettings;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// A clock the test advances by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// A prober fed one outcome at a time through a channel. A probe issued when
/// no outcome is queued parks until one arrives (or the probe is cancelled
/// by shutdown), which lets tests serialize probe commits exactly.
pub struct ChannelProber {
    outcomes: tokio::sync::Mutex<mpsc::UnboundedReceiver<ProbeOutcome>>,
    pub calls: AtomicUsize,
}

impl ChannelProber {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<ProbeOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                outcomes: tokio::sync::Mutex::new(rx),
                calls: AtomicUsize::new(0),
            }),
            tx,
        )
    }
}

#[async_trait]
impl HttpProber for ChannelProber {
    async fn probe(&self, _request: &ProbeRequest) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.outcomes.lock().await;
        match rx.recv().await {
            Some(outcome) => outcome,
            None => futures::future::pending().await,
        }
    }
}

/// A prober that signals when a probe starts and blocks until released.
pub struct BlockingProber {
    started_tx: mpsc::UnboundedSender<()>,
    gate: Arc<Semaphore>,
}

impl BlockingProber {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<()>, Arc<Semaphore>) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        (
            Arc::new(Self {
                started_tx,
                gate: Arc::clone(&gate),
            }),
            started_rx,
            gate,
        )
    }
}

#[async_trait]
impl HttpProber for BlockingProber {
    async fn probe(&self, _request: &ProbeRequest) -> ProbeOutcome {
        let _ = self.started_tx.send(());
        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();
        ProbeOutcome::Success {
            status: 200,
            elapsed: Duration::from_millis(1),
        }
    }
}

/// A certificate checker returning a canned result and counting calls.
pub struct FakeCertChecker {
    response: Mutex<SslCertInfo>,
    pub calls: AtomicUsize,
}

impl FakeCertChecker {
    pub fn new(response: SslCertInfo) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(response),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_response(&self, response: SslCertInfo) {
        *self.response.lock().unwrap() = response;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertExpiryChecker for FakeCertChecker {
    async fn check(&self, _url: &str, _warning_days: u32) -> SslCertInfo {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().unwrap().clone()
    }
}

/// A checker that reports every URL as plain HTTP (no TLS information).
pub struct NullCertChecker;

#[async_trait]
impl CertExpiryChecker for NullCertChecker {
    async fn check(&self, _url: &str, _warning_days: u32) -> SslCertInfo {
        SslCertInfo::default()
    }
}

/// Monitor settings tuned for fast tests.
pub fn fast_settings() -> MonitorSettings {
    MonitorSettings {
        default_check_interval: Duration::from_millis(1),
        ssl_expiry_warning_days: 30,
        ssl_summary_time: "09:30".to_string(),
        health_summary_interval: Duration::ZERO,
        tick_interval: Duration::from_millis(10),
    }
}

/// Polls `condition` every few milliseconds until it holds or the timeout
/// expires.
pub async fn wait_for<F: Fn() -> bool>(condition: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
