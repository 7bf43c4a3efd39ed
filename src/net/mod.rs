//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! --cert/--key (or [listener.tls])
//!     → tls.rs (read PEM pair into a rustls server config)
//!     → axum-server TLS acceptor
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional; without a certificate pair the server speaks plain HTTP
//! - Upstream TLS (to Tempo) lives with the proxy, not here

pub mod tls;

pub use tls::{load_tls_config, TlsError};
