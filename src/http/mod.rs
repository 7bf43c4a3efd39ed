//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → /proxy/...   → request.rs (split routing segments) → proxy router
//!     → /api/v1/...  → registry listing → response.rs (JSON envelope)
//!     → /health, /features, /config → plugin.rs
//!     → anything else → static frontend files
//! ```

pub mod plugin;
pub mod request;
pub mod response;
pub mod server;

pub use request::ProxyPath;
pub use response::ApiResponse;
pub use server::{AppState, HttpServer};
