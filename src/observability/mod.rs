//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / proxy / http handlers produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Skipped resources during discovery are visible only here
//! - Metric calls are no-ops until a recorder is installed, so tests need no setup

pub mod logging;
pub mod metrics;
