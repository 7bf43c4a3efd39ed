//! TLS listener material.

use std::io;
use std::path::PathBuf;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

use crate::config::TlsConfig;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("certificate file not found: {}", .0.display())]
    MissingCertificate(PathBuf),

    #[error("private key file not found: {}", .0.display())]
    MissingKey(PathBuf),

    #[error("cannot load TLS certificate and key: {0}")]
    Load(#[from] io::Error),
}

/// Load the serving certificate and key (PEM).
pub async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    if !tls.cert_path.exists() {
        return Err(TlsError::MissingCertificate(tls.cert_path.clone()));
    }
    if !tls.key_path.exists() {
        return Err(TlsError::MissingKey(tls.key_path.clone()));
    }

    let config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
    tracing::info!(cert = %tls.cert_path.display(), "Loaded serving certificate");
    Ok(config)
}
