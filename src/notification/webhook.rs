//! Generic JSON webhook sink.
//!
//! Posts a flat JSON document describing the alert, with any configured
//! custom fields merged into the top level so receivers can route on them.

use super::{AlertContext, AlertSink};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;

pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
    custom_fields: HashMap<String, String>,
}

impl WebhookSink {
    pub fn new(url: String, custom_fields: HashMap<String, String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            custom_fields,
        }
    }

    fn build_payload(&self, alert: &AlertContext) -> serde_json::Value {
        let state = &alert.state;
        let mut payload = json!({
            "subject": alert.subject,
            "message": alert.message,
            "alert_type": alert.kind.as_str(),
            "endpoint": {
                "name": state.name,
                "url": state.url,
                "method": state.method,
            },
            "state": {
                "status": state.status.to_string(),
                "consecutive_failures": state.consecutive_failures,
                "last_error": state.last_error,
                "response_time_ms": state.response_time.as_millis() as u64,
                "last_check": state.last_check.map(|t| t.to_rfc3339()).unwrap_or_default(),
            },
            "timestamp": alert.timestamp.to_rfc3339(),
        });

        if let Some(object) = payload.as_object_mut() {
            for (key, value) in &self.custom_fields {
                object.insert(key.clone(), json!(value));
            }
        }
        payload
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, alert: &AlertContext) -> Result<()> {
        let payload = self.build_payload(alert);
        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("failed to send webhook alert")?
            .error_for_status()
            .context("webhook returned an error status")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EndpointState, HealthStatus, StoredEndpoint};
    use crate::notification::AlertKind;
    use chrono::Utc;
    use std::time::Duration;

    fn alert() -> AlertContext {
        let stored = StoredEndpoint {
            id: "api".into(),
            name: "Api".into(),
            url: "https://api.example.com".into(),
            method: "GET".into(),
            monitor_health: true,
            ..Default::default()
        };
        let mut state = EndpointState::from_stored(&stored, Utc::now(), Duration::from_secs(30));
        state.status = HealthStatus::Unhealthy;
        state.consecutive_failures = 3;
        state.last_error = "request failed".to_string();
        state.response_time = Duration::from_millis(250);
        state.last_check = Some(Utc::now());

        AlertContext {
            kind: AlertKind::Failure,
            subject: "[SITEWATCH] Alert: Api is DOWN".to_string(),
            message: "Api is down".to_string(),
            state,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn payload_shape_includes_endpoint_and_state() {
        let sink = WebhookSink::new("http://example.invalid".into(), HashMap::new());
        let payload = sink.build_payload(&alert());

        assert_eq!(payload["alert_type"], "failure");
        assert_eq!(payload["endpoint"]["name"], "Api");
        assert_eq!(payload["endpoint"]["method"], "GET");
        assert_eq!(payload["state"]["status"], "unhealthy");
        assert_eq!(payload["state"]["consecutive_failures"], 3);
        assert_eq!(payload["state"]["response_time_ms"], 250);
    }

    #[test]
    fn custom_fields_merge_into_top_level() {
        let sink = WebhookSink::new(
            "http://example.invalid".into(),
            HashMap::from([("team".to_string(), "platform".to_string())]),
        );
        let payload = sink.build_payload(&alert());
        assert_eq!(payload["team"], "platform");
        // Reserved keys stay intact.
        assert_eq!(payload["alert_type"], "failure");
    }

    #[tokio::test]
    async fn posts_json_to_configured_url() {
        use wiremock::matchers::{body_partial_json, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"alert_type": "failure"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri(), HashMap::new());
        sink.send(&alert()).await.unwrap();
    }
}
