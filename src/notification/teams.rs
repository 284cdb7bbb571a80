//! Chat-markdown notifications with two dedicated channels: grouped health
//! alerts and the daily SSL expiry summary.

use crate::core::EndpointState;
use crate::utils::duration::format_dhm;
use crate::utils::time::{format_report_date, format_report_time, reporting_zone};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::time::Duration;

/// An entry in the SSL expiry summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SslExpiryInfo {
    pub endpoint_name: String,
    pub url: String,
    pub expiry_date: DateTime<Utc>,
    pub days_to_expiry: i64,
}

/// Posts markdown payloads to the two chat webhooks.
pub struct TeamsNotifier {
    client: reqwest::Client,
    health_webhook: String,
    ssl_webhook: String,
}

impl TeamsNotifier {
    pub fn new(health_webhook: String, ssl_webhook: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            health_webhook,
            ssl_webhook,
        }
    }

    pub fn has_health_webhook(&self) -> bool {
        !self.health_webhook.is_empty()
    }

    pub fn has_ssl_webhook(&self) -> bool {
        !self.ssl_webhook.is_empty()
    }

    pub async fn post_health(&self, text: &str) -> Result<()> {
        self.post(&self.health_webhook, text).await
    }

    pub async fn post_ssl(&self, text: &str) -> Result<()> {
        self.post(&self.ssl_webhook, text).await
    }

    async fn post(&self, webhook: &str, text: &str) -> Result<()> {
        let payload = serde_json::json!({ "text": text });
        self.client
            .post(webhook)
            .json(&payload)
            .send()
            .await
            .context("failed to send request to chat webhook")?
            .error_for_status()
            .context("chat webhook returned an error status")?;
        Ok(())
    }
}

/// Renders the grouped health alert as a markdown table. Callers pass the
/// unhealthy states already sorted longest-down-first.
pub fn build_health_table(
    interval: Duration,
    check_time: DateTime<Utc>,
    unhealthy: &[EndpointState],
    dashboard_url: &str,
) -> String {
    let now_local = check_time.with_timezone(&reporting_zone());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "📢 HEALTH MONITOR ALERT ({} min)\n",
        interval.as_secs() / 60
    );
    out.push_str(
        "| Site Name | URL | Status | Last Success Time | Down Duration | Failure Count | Response Time |\n",
    );
    out.push_str("|---|---|---|---|---|---|---|\n");

    for state in unhealthy {
        let last_success = state
            .last_success
            .map(format_report_time)
            .unwrap_or_else(|| "-".to_string());

        let down_for = state
            .last_success
            .map(|t| {
                format_dhm(
                    (now_local.with_timezone(&Utc) - t)
                        .to_std()
                        .unwrap_or_default(),
                )
            })
            .unwrap_or_else(|| "-".to_string());

        let response_time = if state.response_time > Duration::ZERO {
            format!("{:.2}ms", state.response_time.as_secs_f64() * 1000.0)
        } else {
            "-".to_string()
        };

        let _ = writeln!(
            out,
            "| {} | {} | 🔴 DOWN | {} | {} | {} | {} |",
            state.name, state.url, last_success, down_for, state.consecutive_failures, response_time,
        );
    }

    if !dashboard_url.is_empty() {
        let _ = write!(out, "\n🔗 For more info visit: {dashboard_url}\n");
    }
    out
}

/// Renders the SSL expiry summary as a markdown table. Callers pass the
/// certificates already sorted most-urgent-first.
pub fn build_ssl_summary_table(expiring: &[SslExpiryInfo], dashboard_url: &str) -> String {
    let mut out = String::from("📢 SSL EXPIRY NOTIFICATIONS\n\n");
    out.push_str("| Endpoint | URL | Expiry Date | Days Left | Severity |\n");
    out.push_str("|---------|-----|------------|-----------|----------|\n");

    for cert in expiring {
        let severity = if cert.days_to_expiry <= 7 {
            "🚨 Critical"
        } else {
            "⚠️ Warning"
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            cert.endpoint_name,
            cert.url,
            format_report_date(cert.expiry_date),
            cert.days_to_expiry,
            severity,
        );
    }

    if !dashboard_url.is_empty() {
        let _ = write!(out, "\n🔗 For more info visit: {dashboard_url}\n");
    }
    out
}
