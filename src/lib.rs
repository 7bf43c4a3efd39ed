//! Backend for the distributed-tracing console plugin.
//!
//! Discovers Tempo instances in the cluster and proxies browser requests to
//! them, one cached reverse proxy per `(namespace, name, tenant)`.

// Core subsystems
pub mod cluster;
pub mod config;
pub mod http;
pub mod net;
pub mod proxy;
pub mod registry;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ConsoleConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
