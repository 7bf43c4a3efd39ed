//! Outbound transport for proxied requests.
//!
//! # Responsibilities
//! - Load the service CA bundle used to verify gateway certificates
//! - Build the HTTP client with dial and keep-alive settings
//!
//! The CA bundle is read on every proxy build and never shared between
//! proxies. The connect timeout covers both the TCP dial and the TLS
//! handshake.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::UpstreamConfig;

/// Longer than typical browser timeouts so the browser gives up first.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Constructing a proxy failed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read certificate file: tried '{}' and got {source}", .path.display())]
    ReadCaFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no CA found in '{}' for Kubernetes services, proxy to datasources will fail", .path.display())]
    NoCertificates { path: PathBuf },

    #[error("invalid CA certificate: {0}")]
    InvalidCertificate(#[source] reqwest::Error),

    #[error("cannot create upstream client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Settings shared by every proxy the router builds.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// PEM bundle with the service CA. `None` uses the default trust store.
    pub service_ca_file: Option<PathBuf>,
    pub dial_timeout: Duration,
    pub keepalive: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            service_ca_file: None,
            dial_timeout: DIAL_TIMEOUT,
            keepalive: KEEPALIVE_INTERVAL,
        }
    }
}

impl From<&UpstreamConfig> for UpstreamSettings {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            service_ca_file: config.service_ca_file.clone(),
            dial_timeout: Duration::from_secs(config.dial_timeout_secs),
            keepalive: Duration::from_secs(config.keepalive_secs),
        }
    }
}

/// Build a client trusting the configured service CA, if any.
pub async fn build_client(settings: &UpstreamSettings) -> Result<reqwest::Client, BuildError> {
    let mut builder = reqwest::Client::builder()
        // also bounds the TLS handshake; there is no separate handshake timeout
        .connect_timeout(settings.dial_timeout)
        .tcp_keepalive(settings.keepalive)
        // redirects are relayed to the browser, never followed
        .redirect(reqwest::redirect::Policy::none());

    if let Some(path) = &settings.service_ca_file {
        for cert in load_ca_bundle(path).await? {
            builder = builder.add_root_certificate(cert);
        }
    }

    builder.build().map_err(BuildError::Client)
}

/// Parse every certificate in a PEM bundle. Blocks that are not valid
/// certificates are ignored; a bundle without any certificate is an error.
pub async fn load_ca_bundle(path: &Path) -> Result<Vec<reqwest::Certificate>, BuildError> {
    let pem = tokio::fs::read(path)
        .await
        .map_err(|source| BuildError::ReadCaFile {
            path: path.to_path_buf(),
            source,
        })?;

    let mut reader = pem.as_slice();
    let ders: Vec<_> = rustls_pemfile::certs(&mut reader)
        .filter_map(Result::ok)
        .collect();
    if ders.is_empty() {
        return Err(BuildError::NoCertificates {
            path: path.to_path_buf(),
        });
    }

    ders.iter()
        .map(|der| reqwest::Certificate::from_der(der.as_ref()).map_err(BuildError::InvalidCertificate))
        .collect()
}
