//! Tempo console plugin backend.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser (console)                                          Cluster
//!     ─────────────────┐
//!                      ▼
//!              ┌──────────────┐   /api/v1/list-tempo-resources  ┌───────────┐
//!              │  http server │───────────────────────────────▶│ registry  │──▶ kube API
//!              │  (axum)      │                                 └───────────┘
//!              │              │   /proxy/{ns}/{name}/{tenant}   ┌───────────┐      ▲
//!              │              │───────────────────────────────▶│  proxy    │──────┘ (on miss)
//!              │              │                                 │  router   │
//!              │              │◀──────── streamed response ─────│  + cache  │──▶ Tempo gateway /
//!              └──────────────┘                                 └───────────┘    query frontend
//!                      │
//!                      └── /health, /features, /config, static frontend files
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use tempo_console_proxy::cluster::KubeLister;
use tempo_console_proxy::config::{load_config, validate_config, ConsoleConfig, TlsConfig};
use tempo_console_proxy::http::HttpServer;
use tempo_console_proxy::lifecycle::Shutdown;
use tempo_console_proxy::net::load_tls_config;
use tempo_console_proxy::observability::{logging, metrics};

/// Command-line flags. Each one overrides the matching config file entry.
#[derive(Debug, Parser)]
#[command(name = "tempo-console-proxy", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(long, env = "TEMPO_CONSOLE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on; keeps the configured bind host.
    #[arg(long)]
    port: Option<u16>,

    /// Serving certificate (PEM).
    #[arg(long)]
    cert: Option<PathBuf>,

    /// Serving private key (PEM).
    #[arg(long)]
    key: Option<PathBuf>,

    /// CA bundle used to verify Tempo services.
    #[arg(long)]
    service_ca_file: Option<PathBuf>,

    /// Directory with the frontend bundle.
    #[arg(long)]
    static_path: Option<PathBuf>,

    /// Plugin settings file served at /config.
    #[arg(long)]
    plugin_config: Option<PathBuf>,

    /// Comma-separated feature flags to enable.
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,
}

impl Args {
    fn apply(self, config: &mut ConsoleConfig) {
        if let Some(port) = self.port {
            let host = config
                .listener
                .bind_address
                .rsplit_once(':')
                .map_or("0.0.0.0", |(host, _)| host);
            config.listener.bind_address = format!("{host}:{port}");
        }

        match (self.cert, self.key) {
            (Some(cert_path), Some(key_path)) => {
                config.listener.tls = Some(TlsConfig {
                    cert_path,
                    key_path,
                })
            }
            (None, None) => {}
            _ => tracing::warn!("Both --cert and --key are required for TLS, ignoring"),
        }

        if self.service_ca_file.is_some() {
            config.upstream.service_ca_file = self.service_ca_file;
        }
        if let Some(path) = self.static_path {
            config.frontend.static_path = path;
        }
        if self.plugin_config.is_some() {
            config.frontend.plugin_config_path = self.plugin_config;
        }

        let enabled: BTreeMap<String, bool> = self
            .features
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .map(|f| (f, true))
            .collect();
        config.frontend.features.extend(enabled);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ConsoleConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("tempo-console-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    args.apply(&mut config);
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    // kube, reqwest and axum-server all speak rustls; pin one provider
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        tracing::debug!("rustls crypto provider already installed");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        service_ca_file = ?config.upstream.service_ca_file,
        cache_capacity = config.upstream.cache_capacity,
        static_path = %config.frontend.static_path.display(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let lister = KubeLister::try_default().await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let tls = config.listener.tls.clone();
    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let server = HttpServer::new(config, Arc::new(lister));

    match tls {
        Some(tls) => {
            let rustls_config = load_tls_config(&tls).await?;
            server.run_tls(addr, rustls_config, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
