//! Slack webhook sink.
//!
//! Builds the classic attachment-style payload: a colored bar, a short
//! two-column field grid, and the error text on failures.

use super::{AlertContext, AlertKind, AlertSink};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

/// Top-level Slack message payload.
#[derive(Serialize, Debug)]
pub struct SlackMessage {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// A single attachment with a color bar and a field grid.
#[derive(Serialize, Debug)]
pub struct Attachment {
    pub color: String,
    pub fields: Vec<Field>,
    pub footer: String,
    pub ts: i64,
}

/// One key/value field inside an attachment.
#[derive(Serialize, Debug)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// Builds the Slack payload for a failure or recovery alert.
pub fn build_slack_message(alert: &AlertContext) -> SlackMessage {
    let (color, emoji) = match alert.kind {
        AlertKind::Failure => ("danger", "🔴"),
        AlertKind::Recovery => ("good", "✅"),
    };

    let mut fields = vec![
        Field {
            title: "Endpoint".to_string(),
            value: alert.state.name.clone(),
            short: true,
        },
        Field {
            title: "URL".to_string(),
            value: alert.state.url.clone(),
            short: true,
        },
        Field {
            title: "Status".to_string(),
            value: alert.state.status.to_string(),
            short: true,
        },
        Field {
            title: "Response Time".to_string(),
            value: format!("{:?}", alert.state.response_time),
            short: true,
        },
    ];

    if !alert.state.last_error.is_empty() {
        fields.push(Field {
            title: "Error".to_string(),
            value: alert.state.last_error.clone(),
            short: false,
        });
    }

    SlackMessage {
        text: format!("{} {}", emoji, alert.subject),
        attachments: vec![Attachment {
            color: color.to_string(),
            fields,
            footer: "SiteWatch Health Monitor".to_string(),
            ts: alert.timestamp.timestamp(),
        }],
    }
}

/// Sink posting alerts to a Slack incoming webhook.
pub struct SlackSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackSink {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl AlertSink for SlackSink {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, alert: &AlertContext) -> Result<()> {
        let message = build_slack_message(alert);
        self.client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await
            .context("failed to send request to Slack webhook")?
            .error_for_status()
            .context("Slack API returned an error status")?;
        Ok(())
    }
}
