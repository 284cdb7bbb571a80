//! Core domain types and service traits for SiteWatch
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the application.

use crate::utils::duration as serde_duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Health status of a monitored endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    #[default]
    Unknown,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
            HealthStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Durable endpoint record, keyed by its sanitized id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoredEndpoint {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default, with = "serde_duration")]
    pub timeout: Duration,
    #[serde(default, with = "serde_duration")]
    pub check_interval: Duration,
    #[serde(default)]
    pub expected_status: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub failure_threshold: u32,
    #[serde(default)]
    pub success_threshold: u32,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub alerts_suppressed: bool,
    #[serde(default)]
    pub monitor_health: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A single health check result appended to history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthCheckRecord {
    pub endpoint_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: HealthStatus,
    #[serde(with = "serde_duration")]
    pub response_time: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Which side of the unhealthy boundary a status transition crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEdge {
    /// The endpoint just became unhealthy.
    Failure,
    /// The endpoint just recovered from unhealthy to healthy.
    Recovery,
}

/// Runtime state of a monitored endpoint, owned by the monitor.
#[derive(Debug, Clone)]
pub struct EndpointState {
    pub id: String,
    pub name: String,
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
    pub expected_status: u16,
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub check_interval: Duration,
    pub enabled: bool,
    pub alerts_suppressed: bool,
    pub monitor_health: bool,
    pub status: HealthStatus,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub last_check: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_status_change: Option<DateTime<Utc>>,
    pub next_check: DateTime<Utc>,
    pub response_time: Duration,
    pub last_error: String,
    pub ssl_cert_expiry: Option<DateTime<Utc>>,
    pub days_to_expiry: i64,
    pub ssl_expiring_soon: bool,
    pub last_ssl_check: Option<DateTime<Utc>>,
}

impl EndpointState {
    /// Builds the initial runtime projection of a stored record.
    ///
    /// Status starts at `unknown` and the first check is due immediately.
    /// A zero `check_interval` on a health-monitored endpoint falls back to
    /// the global default.
    pub fn from_stored(stored: &StoredEndpoint, now: DateTime<Utc>, default_interval: Duration) -> Self {
        let check_interval = if stored.check_interval.is_zero() && stored.monitor_health {
            default_interval
        } else {
            stored.check_interval
        };

        Self {
            id: stored.id.clone(),
            name: stored.name.clone(),
            url: stored.url.clone(),
            method: stored.method.clone(),
            headers: stored.headers.clone(),
            timeout: stored.timeout,
            expected_status: stored.expected_status,
            failure_threshold: stored.failure_threshold,
            success_threshold: stored.success_threshold,
            check_interval,
            enabled: stored.enabled,
            alerts_suppressed: stored.alerts_suppressed,
            monitor_health: stored.monitor_health,
            status: HealthStatus::Unknown,
            consecutive_failures: 0,
            consecutive_successes: 0,
            last_check: None,
            last_success: None,
            last_status_change: None,
            next_check: now,
            response_time: Duration::ZERO,
            last_error: String::new(),
            ssl_cert_expiry: None,
            days_to_expiry: 0,
            ssl_expiring_soon: false,
            last_ssl_check: None,
        }
    }

    /// Applies a successful probe outcome under the hysteresis rules.
    ///
    /// Returns the alert edge if this outcome crossed one. `last_status_change`
    /// is updated before the edge is reported so downtime math in the alert
    /// uses the new boundary.
    pub fn apply_success(&mut self, now: DateTime<Utc>, elapsed: Duration) -> Option<AlertEdge> {
        self.last_check = Some(now);
        self.next_check = now + self.check_interval;
        self.response_time = elapsed;
        self.consecutive_failures = 0;
        self.consecutive_successes += 1;
        self.last_error.clear();
        self.last_success = Some(now);

        let previous = self.status;
        if self.consecutive_successes >= self.success_threshold {
            self.status = HealthStatus::Healthy;
        }

        if previous == HealthStatus::Unhealthy && self.status == HealthStatus::Healthy {
            self.last_status_change = Some(now);
            return Some(AlertEdge::Recovery);
        }
        None
    }

    /// Applies a failed probe outcome under the hysteresis rules.
    pub fn apply_failure(
        &mut self,
        now: DateTime<Utc>,
        error: String,
        elapsed: Duration,
    ) -> Option<AlertEdge> {
        self.last_check = Some(now);
        self.next_check = now + self.check_interval;
        self.response_time = elapsed;
        self.consecutive_successes = 0;
        self.consecutive_failures += 1;
        self.last_error = error;

        let previous = self.status;
        if self.consecutive_failures >= self.failure_threshold {
            self.status = HealthStatus::Unhealthy;
        }

        if previous != HealthStatus::Unhealthy && self.status == HealthStatus::Unhealthy {
            self.last_status_change = Some(now);
            return Some(AlertEdge::Failure);
        }
        None
    }

    /// True when the daily TLS cadence allows another certificate probe.
    pub fn ssl_check_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_ssl_check {
            None => true,
            Some(last) => now - last >= chrono::Duration::hours(24),
        }
    }
}

/// Result of a TLS certificate expiry probe.
#[derive(Debug, Clone, Default)]
pub struct SslCertInfo {
    pub is_https: bool,
    pub expiry: Option<DateTime<Utc>>,
    pub days_to_expiry: i64,
    pub expiring_soon: bool,
    pub error: Option<String>,
}

/// Outcome of a single HTTP probe.
///
/// `Success` means transport success for any status code; whether the status
/// matches the expectation is decided by the monitor, so an unexpected status
/// still carries its code into the history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success { status: u16, elapsed: Duration },
    Failure { error: String, elapsed: Duration },
}

/// The per-probe request snapshot handed to an [`HttpProber`].
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
}

// =============================================================================
// Service Traits
// =============================================================================

/// Performs a single HTTP liveness probe.
#[async_trait]
pub trait HttpProber: Send + Sync {
    async fn probe(&self, request: &ProbeRequest) -> ProbeOutcome;
}

/// Inspects the TLS certificate presented by an HTTPS endpoint.
///
/// Implementations accept whatever certificate the server presents; only the
/// leaf's expiry is of interest.
#[async_trait]
pub trait CertExpiryChecker: Send + Sync {
    async fn check(&self, url: &str, warning_days: u32) -> SslCertInfo;
}

/// Source of "now", injectable so tests can drive time deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(failure_threshold: u32, success_threshold: u32) -> EndpointState {
        let stored = StoredEndpoint {
            id: "test".into(),
            name: "Test".into(),
            url: "https://example.com".into(),
            method: "GET".into(),
            timeout: Duration::from_secs(10),
            check_interval: Duration::from_secs(30),
            expected_status: 200,
            failure_threshold,
            success_threshold,
            enabled: true,
            monitor_health: true,
            ..Default::default()
        };
        EndpointState::from_stored(&stored, Utc::now(), Duration::from_secs(30))
    }

    #[test]
    fn hysteresis_sequence_matches_thresholds() {
        // F=3, S=2, outcomes [ok, ok, fail, fail, fail, ok, ok].
        let mut st = state(3, 2);
        let now = Utc::now();
        let d = Duration::from_millis(5);

        let mut statuses = Vec::new();
        let mut edges = Vec::new();

        for (i, ok) in [true, true, false, false, false, true, true].iter().enumerate() {
            let edge = if *ok {
                st.apply_success(now + chrono::Duration::seconds(i as i64), d)
            } else {
                st.apply_failure(now + chrono::Duration::seconds(i as i64), "boom".into(), d)
            };
            statuses.push(st.status);
            if let Some(e) = edge {
                edges.push((i + 1, e));
            }
        }

        use HealthStatus::*;
        assert_eq!(
            statuses,
            vec![Unknown, Healthy, Healthy, Healthy, Unhealthy, Unhealthy, Healthy]
        );
        assert_eq!(edges, vec![(5, AlertEdge::Failure), (7, AlertEdge::Recovery)]);
    }

    #[test]
    fn counters_are_mutually_exclusive() {
        let mut st = state(3, 2);
        let now = Utc::now();
        let d = Duration::ZERO;

        st.apply_success(now, d);
        st.apply_success(now, d);
        assert_eq!(st.consecutive_failures, 0);
        assert_eq!(st.consecutive_successes, 2);

        st.apply_failure(now, "err".into(), d);
        assert_eq!(st.consecutive_failures, 1);
        assert_eq!(st.consecutive_successes, 0);
    }

    #[test]
    fn unknown_to_unhealthy_fires_failure_edge_once() {
        let mut st = state(2, 1);
        let now = Utc::now();
        let d = Duration::ZERO;

        assert_eq!(st.apply_failure(now, "e".into(), d), None);
        assert_eq!(st.apply_failure(now, "e".into(), d), Some(AlertEdge::Failure));
        // Further failures keep the status without re-firing the edge.
        assert_eq!(st.apply_failure(now, "e".into(), d), None);
    }

    #[test]
    fn unknown_to_healthy_fires_no_edge() {
        let mut st = state(3, 2);
        let now = Utc::now();
        assert_eq!(st.apply_success(now, Duration::ZERO), None);
        assert_eq!(st.apply_success(now, Duration::ZERO), None);
        assert_eq!(st.status, HealthStatus::Healthy);
    }

    #[test]
    fn next_check_tracks_last_check_plus_interval() {
        let mut st = state(3, 2);
        let now = Utc::now();
        st.apply_success(now, Duration::ZERO);
        assert_eq!(st.next_check, now + st.check_interval);
        assert_eq!(st.last_check, Some(now));
    }

    #[test]
    fn success_clears_last_error() {
        let mut st = state(1, 1);
        let now = Utc::now();
        st.apply_failure(now, "connection refused".into(), Duration::ZERO);
        assert_eq!(st.last_error, "connection refused");
        st.apply_success(now, Duration::ZERO);
        assert!(st.last_error.is_empty());
    }

    #[test]
    fn ssl_cadence_is_daily() {
        let mut st = state(3, 2);
        let now = Utc::now();
        assert!(st.ssl_check_due(now));
        st.last_ssl_check = Some(now);
        assert!(!st.ssl_check_due(now + chrono::Duration::hours(1)));
        assert!(st.ssl_check_due(now + chrono::Duration::hours(24)));
    }

    #[test]
    fn zero_interval_falls_back_to_default_for_health_endpoints() {
        let stored = StoredEndpoint {
            id: "x".into(),
            name: "X".into(),
            url: "https://x".into(),
            monitor_health: true,
            ..Default::default()
        };
        let st = EndpointState::from_stored(&stored, Utc::now(), Duration::from_secs(30));
        assert_eq!(st.check_interval, Duration::from_secs(30));

        let stored_ssl_only = StoredEndpoint {
            monitor_health: false,
            ..stored
        };
        let st = EndpointState::from_stored(&stored_ssl_only, Utc::now(), Duration::from_secs(30));
        assert_eq!(st.check_interval, Duration::ZERO);
    }

    #[test]
    fn stored_endpoint_round_trips_through_json() {
        let ep = StoredEndpoint {
            id: "My-Api-https-api-example-com".into(),
            name: "My Api".into(),
            url: "https://api.example.com".into(),
            method: "GET".into(),
            timeout: Duration::from_secs(10),
            check_interval: Duration::from_secs(30),
            expected_status: 200,
            headers: HashMap::from([("X-Token".to_string(), "abc".to_string())]),
            failure_threshold: 3,
            success_threshold: 2,
            enabled: true,
            alerts_suppressed: false,
            monitor_health: true,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        let json = serde_json::to_string(&ep).unwrap();
        let back: StoredEndpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ep);
    }

    #[test]
    fn stored_endpoint_accepts_string_durations_and_absent_fields() {
        let back: StoredEndpoint = serde_json::from_str(
            r#"{"name": "A", "url": "https://a", "timeout": "10s", "check_interval": "1m"}"#,
        )
        .unwrap();
        assert_eq!(back.timeout, Duration::from_secs(10));
        assert_eq!(back.check_interval, Duration::from_secs(60));
        assert_eq!(back.expected_status, 0);
        assert!(back.created_at.is_none());
    }
}
