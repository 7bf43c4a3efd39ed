//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tempo_discovery_listed_total` (counter): instances returned by discovery
//! - `tempo_discovery_skipped_total` (counter): resources dropped, by reason
//! - `tempo_proxy_cache_total` (counter): cache lookups, by result
//! - `tempo_proxy_builds_total` (counter): upstream proxies constructed
//! - `tempo_proxy_upstream_errors_total` (counter): backend connection failures
//! - `tempo_proxy_request_duration_seconds` (histogram): latency by status

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape listener. Must run inside the tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_discovery(listed: usize) {
    counter!("tempo_discovery_listed_total").increment(listed as u64);
}

pub fn record_discovery_skip(reason: &'static str) {
    counter!("tempo_discovery_skipped_total", "reason" => reason).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("tempo_proxy_cache_total", "result" => result).increment(1);
}

pub fn record_proxy_build() {
    counter!("tempo_proxy_builds_total").increment(1);
}

pub fn record_upstream_error() {
    counter!("tempo_proxy_upstream_errors_total").increment(1);
}

pub fn record_request(status: u16, start: Instant) {
    histogram!("tempo_proxy_request_duration_seconds", "status" => status.to_string())
        .record(start.elapsed().as_secs_f64());
}
