//! HTTP probe implementation.
//!
//! A probe is a single request with the endpoint's method and headers and no
//! body. Transport success is reported as success whatever the status code;
//! the monitor decides whether the code matches the expectation. The response
//! body is never read.

use crate::core::{HttpProber, ProbeOutcome, ProbeRequest};
use async_trait::async_trait;
use reqwest::Method;
use std::time::Instant;

/// The production prober, sharing one `reqwest` client across all probes.
///
/// No client-wide timeout is set; each request carries the endpoint's own.
pub struct ReqwestProber {
    client: reqwest::Client,
}

impl ReqwestProber {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpProber for ReqwestProber {
    async fn probe(&self, request: &ProbeRequest) -> ProbeOutcome {
        let start = Instant::now();

        let method = match Method::from_bytes(request.method.as_bytes()) {
            Ok(m) => m,
            Err(e) => {
                return ProbeOutcome::Failure {
                    error: format!("failed to create request: {e}"),
                    elapsed: start.elapsed(),
                }
            }
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        match builder.send().await {
            Ok(response) => ProbeOutcome::Success {
                status: response.status().as_u16(),
                elapsed: start.elapsed(),
            },
            Err(e) if e.is_timeout() => ProbeOutcome::Failure {
                error: format!("request timed out after {:?}", request.timeout),
                elapsed: start.elapsed(),
            },
            Err(e) => ProbeOutcome::Failure {
                error: format!("request failed: {e}"),
                elapsed: start.elapsed(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(url: String) -> ProbeRequest {
        ProbeRequest {
            url,
            method: "GET".to_string(),
            headers: HashMap::new(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn reports_status_code_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let prober = ReqwestProber::new();
        let outcome = prober.probe(&request(format!("{}/health", server.uri()))).await;

        match outcome {
            ProbeOutcome::Success { status, .. } => assert_eq!(status, 200),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_status_is_still_transport_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let prober = ReqwestProber::new();
        let outcome = prober.probe(&request(server.uri())).await;

        match outcome {
            ProbeOutcome::Success { status, .. } => assert_eq!(status, 503),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sends_configured_method_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(header("X-Api-Key", "secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let prober = ReqwestProber::new();
        let mut req = request(server.uri());
        req.method = "HEAD".to_string();
        req.headers.insert("X-Api-Key".to_string(), "secret".to_string());

        let outcome = prober.probe(&req).await;
        assert!(matches!(outcome, ProbeOutcome::Success { status: 200, .. }));
    }

    #[tokio::test]
    async fn timeout_becomes_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let prober = ReqwestProber::new();
        let mut req = request(server.uri());
        req.timeout = Duration::from_millis(100);

        match prober.probe(&req).await {
            ProbeOutcome::Failure { error, .. } => {
                assert!(error.contains("timed out"), "unexpected error: {error}")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_becomes_failure() {
        let prober = ReqwestProber::new();
        // Port 1 is essentially guaranteed to refuse connections.
        let outcome = prober.probe(&request("http://127.0.0.1:1/".to_string())).await;
        assert!(matches!(outcome, ProbeOutcome::Failure { .. }));
    }
}
