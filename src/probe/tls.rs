//! TLS certificate expiry probe.
//!
//! Opens a TCP+TLS handshake to the endpoint's host and inspects the leaf
//! certificate the server presents. Chain and hostname verification are
//! deliberately disabled: the probe's job is to report the expiry of
//! whatever certificate is actually being served, including self-signed or
//! misconfigured ones.

use crate::core::{CertExpiryChecker, Clock, SslCertInfo};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use rustls::pki_types::ServerName;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use x509_parser::parse_x509_certificate;

/// Upper bound on the TCP connect plus TLS handshake.
const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// The production certificate checker.
pub struct RustlsCertChecker {
    connector: TlsConnector,
    clock: Arc<dyn Clock>,
}

impl RustlsCertChecker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_safe_default_protocol_versions()
        .expect("safe default protocol versions")
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(danger::AcceptAnyCert))
        .with_no_client_auth();

        Self {
            connector: TlsConnector::from(Arc::new(config)),
            clock,
        }
    }

    async fn fetch_leaf_expiry(&self, host: &str, port: u16) -> Result<DateTime<Utc>> {
        let server_name =
            ServerName::try_from(host.to_string()).context("invalid server name")?;

        let handshake = async {
            let tcp = TcpStream::connect((host, port))
                .await
                .context("failed to connect")?;
            self.connector
                .connect(server_name, tcp)
                .await
                .context("TLS handshake failed")
        };

        let stream = tokio::time::timeout(DIAL_TIMEOUT, handshake)
            .await
            .map_err(|_| anyhow::anyhow!("TLS dial timed out after {DIAL_TIMEOUT:?}"))??;

        let (_, session) = stream.get_ref();
        let certs = session
            .peer_certificates()
            .filter(|c| !c.is_empty())
            .context("no certificates presented")?;

        let (_, leaf) = parse_x509_certificate(certs[0].as_ref())
            .map_err(|e| anyhow::anyhow!("failed to parse certificate: {e}"))?;
        let not_after = leaf.validity().not_after.timestamp();

        DateTime::from_timestamp(not_after, 0).context("certificate expiry out of range")
    }
}

#[async_trait]
impl CertExpiryChecker for RustlsCertChecker {
    async fn check(&self, url: &str, warning_days: u32) -> SslCertInfo {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(_) => {
                return SslCertInfo {
                    error: Some("invalid URL".to_string()),
                    ..Default::default()
                }
            }
        };

        if parsed.scheme() != "https" {
            return SslCertInfo::default();
        }

        let Some(host) = parsed.host_str() else {
            return SslCertInfo {
                is_https: true,
                error: Some("invalid hostname".to_string()),
                ..Default::default()
            };
        };
        let port = parsed.port().unwrap_or(443);

        match self.fetch_leaf_expiry(host, port).await {
            Ok(expiry) => {
                let now = self.clock.now();
                let days_to_expiry = (expiry - now).num_seconds().div_euclid(86_400);
                SslCertInfo {
                    is_https: true,
                    expiry: Some(expiry),
                    days_to_expiry,
                    expiring_soon: days_to_expiry >= 0 && days_to_expiry <= warning_days as i64,
                    error: None,
                }
            }
            Err(e) => SslCertInfo {
                is_https: true,
                error: Some(format!("{e:#}")),
                ..Default::default()
            },
        }
    }
}

mod danger {
    //! A verifier that accepts any presented certificate. The probe reports
    //! expiry, it does not vouch for the chain.

    use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{DigitallySignedStruct, Error, SignatureScheme};

    #[derive(Debug)]
    pub struct AcceptAnyCert;

    impl ServerCertVerifier for AcceptAnyCert {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            _message: &[u8],
            _cert: &CertificateDer<'_>,
            _dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, Error> {
            Ok(HandshakeSignatureValid::assertion())
        }

        fn verify_tls13_signature(
            &self,
            _message: &[u8],
            _cert: &CertificateDer<'_>,
            _dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, Error> {
            Ok(HandshakeSignatureValid::assertion())
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            rustls::crypto::ring::default_provider()
                .signature_verification_algorithms
                .supported_schemes()
        }
    }
}
