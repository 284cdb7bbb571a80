//! Configuration management for SiteWatch
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a JSON file over serde defaults.

use crate::utils::duration as serde_duration;
use figment::{
    providers::{Format, Json},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub log_level: String,
    /// Default probe interval for endpoints that do not set their own.
    #[serde(with = "serde_duration")]
    pub check_interval: Duration,
    /// Certificates within this many days of expiry are flagged. Zero means
    /// only already-expired certificates flag.
    pub ssl_expiry_warning_days: u32,
    /// Wall-clock time (HH:MM, reporting timezone) of the daily SSL summary.
    pub ssl_summary_time: String,
    /// Cadence of the grouped health report. Zero disables it.
    #[serde(with = "serde_duration")]
    pub health_summary_interval: Duration,
    pub admin_passkey: String,
    pub endpoints: Vec<EndpointConfig>,
    pub alerting: AlertingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: "info".to_string(),
            check_interval: Duration::from_secs(30),
            ssl_expiry_warning_days: 30,
            ssl_summary_time: "09:30".to_string(),
            health_summary_interval: Duration::ZERO,
            admin_passkey: String::new(),
            endpoints: Vec::new(),
            alerting: AlertingConfig::default(),
        }
    }
}

/// Web server settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 8080,
        }
    }
}

/// An endpoint seeded from the config file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    pub name: String,
    pub url: String,
    pub method: String,
    #[serde(with = "serde_duration")]
    pub timeout: Duration,
    #[serde(with = "serde_duration")]
    pub check_interval: Duration,
    pub expected_status: u16,
    pub headers: HashMap<String, String>,
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub monitor_health: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            method: String::new(),
            timeout: Duration::ZERO,
            check_interval: Duration::ZERO,
            expected_status: 0,
            headers: HashMap::new(),
            failure_threshold: 0,
            success_threshold: 0,
            monitor_health: true,
        }
    }
}

/// Alerting settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AlertingConfig {
    pub enabled: bool,
    pub teams_enabled: bool,
    /// Chat-markdown webhook for health alerts.
    pub teams_webhook_health_check: String,
    /// Chat-markdown webhook for the daily SSL expiry summary.
    pub teams_webhook_ssl_expiry: String,
    /// Generic JSON webhook; empty disables it.
    pub webhook_url: String,
    pub slack_enabled: bool,
    pub slack_webhook: String,
    pub email_enabled: bool,
    pub email_config: EmailConfig,
    /// Extra key/value pairs merged into generic webhook payloads.
    pub custom_fields: HashMap<String, String>,
    /// Optional link appended to chat-markdown notifications.
    pub dashboard_url: String,
}

/// SMTP settings for the email sink.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from: String,
    pub to: Vec<String>,
    pub username: String,
    pub password: String,
}

impl Config {
    /// Loads the configuration from a JSON file merged over defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!("config file not found at {:?}", path);
        }

        let figment = Figment::new()
            .merge(figment::providers::Serialized::defaults(Config::default()))
            .merge(Json::file(path));

        let mut config: Config = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("configuration loading error: {}", e))?;

        config.normalize();
        Ok(config)
    }

    /// Fixes up values a config file may legitimately leave at zero/empty.
    fn normalize(&mut self) {
        if self.check_interval.is_zero() {
            self.check_interval = Duration::from_secs(30);
        }
        if self.server.port == 0 {
            self.server.port = 8080;
        }
        if self.ssl_summary_time.is_empty() {
            self.ssl_summary_time = "09:30".to_string();
        }
    }
}
