//! Alert construction and fan-out to the configured sinks.
//!
//! Individual failure/recovery alerts are dispatched fire-and-forget: each
//! sink send runs in its own task so a slow webhook can never stall the
//! probe path. Sink errors are logged and swallowed.

pub mod email;
pub mod slack;
pub mod teams;
pub mod webhook;

pub use teams::SslExpiryInfo;

use crate::config::AlertingConfig;
use crate::core::EndpointState;
use chrono::{DateTime, Utc};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

use email::EmailSink;
use slack::SlackSink;
use teams::TeamsNotifier;
use webhook::WebhookSink;

/// Whether an alert reports a failure or a recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Failure,
    Recovery,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Failure => "failure",
            AlertKind::Recovery => "recovery",
        }
    }
}

/// Everything a sink needs to format one alert.
#[derive(Debug, Clone)]
pub struct AlertContext {
    pub kind: AlertKind,
    pub subject: String,
    pub message: String,
    pub state: EndpointState,
    pub timestamp: DateTime<Utc>,
}

/// A single-shot alert destination.
#[async_trait::async_trait]
pub trait AlertSink: Send + Sync {
    /// A short name used in logs ("webhook", "slack", "email").
    fn name(&self) -> &'static str;

    async fn send(&self, alert: &AlertContext) -> anyhow::Result<()>;
}

/// Builds alert payloads and fans them out to the configured sinks.
pub struct Alerter {
    enabled: bool,
    sinks: Vec<Arc<dyn AlertSink>>,
    teams: Option<TeamsNotifier>,
    dashboard_url: String,
}

impl Alerter {
    pub fn new(config: &AlertingConfig) -> Self {
        let mut sinks: Vec<Arc<dyn AlertSink>> = Vec::new();

        if !config.webhook_url.is_empty() {
            sinks.push(Arc::new(WebhookSink::new(
                config.webhook_url.clone(),
                config.custom_fields.clone(),
            )));
        }
        if config.slack_enabled && !config.slack_webhook.is_empty() {
            sinks.push(Arc::new(SlackSink::new(config.slack_webhook.clone())));
        }
        if config.email_enabled {
            match EmailSink::from_config(&config.email_config) {
                Ok(sink) => sinks.push(Arc::new(sink)),
                Err(e) => error!("Email sink disabled: {e:#}"),
            }
        }

        let teams = if config.teams_enabled {
            Some(TeamsNotifier::new(
                config.teams_webhook_health_check.clone(),
                config.teams_webhook_ssl_expiry.clone(),
            ))
        } else {
            None
        };

        Self {
            enabled: config.enabled,
            sinks,
            teams,
            dashboard_url: config.dashboard_url.clone(),
        }
    }

    /// A muted alerter, for when alerting is turned off entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            sinks: Vec::new(),
            teams: None,
            dashboard_url: String::new(),
        }
    }

    /// Sends an alert for an endpoint that just became unhealthy.
    pub fn send_failure_alert(&self, state: &EndpointState, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }

        let message = format!(
            "🔴 ALERT: Endpoint '{}' is UNHEALTHY\n\n\
             URL: {}\n\
             Status: {}\n\
             Consecutive Failures: {}\n\
             Last Error: {}\n\
             Last Check: {}\n\
             Response Time: {:?}",
            state.name,
            state.url,
            state.status,
            state.consecutive_failures,
            state.last_error,
            state.last_check.map(|t| t.to_rfc3339()).unwrap_or_default(),
            state.response_time,
        );
        let subject = format!("[SITEWATCH] Alert: {} is DOWN", state.name);

        self.dispatch(AlertContext {
            kind: AlertKind::Failure,
            subject,
            message,
            state: state.clone(),
            timestamp: now,
        });
    }

    /// Sends an alert for an endpoint that just recovered.
    pub fn send_recovery_alert(&self, state: &EndpointState, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }

        let downtime = state
            .last_status_change
            .map(|t| (now - t).to_std().unwrap_or_default())
            .unwrap_or_default();
        let message = format!(
            "✅ RECOVERY: Endpoint '{}' is HEALTHY\n\n\
             URL: {}\n\
             Status: {}\n\
             Downtime: {:?}\n\
             Response Time: {:?}\n\
             Last Check: {}",
            state.name,
            state.url,
            state.status,
            downtime,
            state.response_time,
            state.last_check.map(|t| t.to_rfc3339()).unwrap_or_default(),
        );
        let subject = format!("[SITEWATCH] Recovery: {} is UP", state.name);

        self.dispatch(AlertContext {
            kind: AlertKind::Recovery,
            subject,
            message,
            state: state.clone(),
            timestamp: now,
        });
    }

    /// Spawns one send task per sink so alert delivery never blocks the
    /// caller.
    fn dispatch(&self, alert: AlertContext) {
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let alert = alert.clone();
            tokio::spawn(async move {
                match sink.send(&alert).await {
                    Ok(()) => {
                        metrics::counter!("alerts_sent").increment(1);
                        info!(
                            "{} alert sent via {} for endpoint: {}",
                            alert.kind.as_str(),
                            sink.name(),
                            alert.state.name
                        );
                    }
                    Err(e) => {
                        metrics::counter!("alert_send_failures").increment(1);
                        error!("Failed to send {} alert: {e:#}", sink.name());
                    }
                }
            });
        }
    }

    /// Posts a markdown table of currently-unhealthy endpoints to the
    /// health-check chat channel. No-op when alerting or the channel is off,
    /// or when nothing is unhealthy.
    pub async fn send_grouped_health_alert(
        &self,
        interval: Duration,
        check_time: DateTime<Utc>,
        mut unhealthy: Vec<EndpointState>,
    ) {
        if !self.enabled || unhealthy.is_empty() {
            return;
        }
        let Some(teams) = self.teams.as_ref().filter(|t| t.has_health_webhook()) else {
            return;
        };

        // Longest-down endpoints first.
        unhealthy.sort_by_key(|s| s.last_status_change);
        let text = teams::build_health_table(interval, check_time, &unhealthy, &self.dashboard_url);

        match teams.post_health(&text).await {
            Ok(()) => info!(
                "Grouped health alert sent ({} endpoints, interval={:?})",
                unhealthy.len(),
                interval
            ),
            Err(e) => error!("Grouped health alert failed: {e:#}"),
        }
    }

    /// Posts the daily SSL expiry summary table to its chat channel.
    pub async fn send_ssl_expiry_summary(&self, mut expiring: Vec<SslExpiryInfo>) {
        let Some(teams) = self.teams.as_ref().filter(|t| t.has_ssl_webhook()) else {
            return;
        };
        if expiring.is_empty() {
            info!("No expiring SSL certificates to report");
            return;
        }

        // Most urgent first.
        expiring.sort_by_key(|c| c.days_to_expiry);
        let text = teams::build_ssl_summary_table(&expiring, &self.dashboard_url);

        match teams.post_ssl(&text).await {
            Ok(()) => info!("SSL expiry summary sent ({} endpoints)", expiring.len()),
            Err(e) => error!("Failed to send SSL expiry summary: {e:#}"),
        }
    }
}
