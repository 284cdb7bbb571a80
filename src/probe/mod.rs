//! Probe implementations: HTTP liveness and TLS certificate expiry.

pub mod http;
pub mod tls;

pub use http::ReqwestProber;
pub use tls::RustlsCertChecker;
