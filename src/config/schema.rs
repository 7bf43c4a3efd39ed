//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the console
//! backend. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::proxy::cache::DEFAULT_CAPACITY;

/// Root configuration for the console backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Settings for connections to Tempo instances.
    pub upstream: UpstreamConfig,

    /// Console frontend assets and plugin settings.
    pub frontend: FrontendConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9002").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9002".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// Upstream (Tempo) connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// PEM bundle of the cluster service CA.
    pub service_ca_file: Option<PathBuf>,

    /// Maximum number of cached proxies.
    pub cache_capacity: u64,

    /// TCP connect and TLS handshake timeout in seconds.
    pub dial_timeout_secs: u64,

    /// TCP keep-alive interval in seconds.
    pub keepalive_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            service_ca_file: None,
            cache_capacity: DEFAULT_CAPACITY,
            dial_timeout_secs: 300,
            keepalive_secs: 30,
        }
    }
}

/// Console frontend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Directory with the compiled plugin assets.
    pub static_path: PathBuf,

    /// YAML file with plugin settings served at `/config`.
    pub plugin_config_path: Option<PathBuf>,

    /// Feature flags served at `/features`.
    pub features: BTreeMap<String, bool>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            static_path: PathBuf::from("./web/dist"),
            plugin_config_path: None,
            features: BTreeMap::new(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds. Replaced by the plugin `timeout`
    /// when one is configured.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
