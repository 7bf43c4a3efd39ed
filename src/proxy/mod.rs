//! Proxy routing subsystem.
//!
//! # Data Flow
//! ```text
//! (namespace, name, tenant) + request
//!     → router.rs (validate, cache lookup)
//!     → miss: registry listing → target.rs (URL) + transport.rs (client)
//!     → cache.rs (insert, LRU bounded)
//!     → upstream.rs (forward, stream back)
//!     → headers.rs (strip unsafe response headers)
//! ```
//!
//! # Design Decisions
//! - Proxies are built lazily and cached; the registry is only consulted on a miss
//! - Two concurrent misses for one key may both build; the last insert wins
//! - No retries: failures surface to the current request immediately

pub mod cache;
pub mod headers;
pub mod router;
pub mod target;
pub mod transport;
pub mod upstream;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::ApiResponse;
use crate::registry::DiscoveryError;

pub use cache::{ProxyCache, RouteKey};
pub use router::ProxyRouter;
pub use transport::{BuildError, UpstreamSettings};
pub use upstream::TempoProxy;

/// A request could not be routed to a Tempo instance.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("cannot proxy request, namespace was not provided")]
    MissingNamespace,

    #[error("cannot proxy request, tempo name was not provided")]
    MissingName,

    #[error("cannot proxy request, {field} must not contain '/': {value:?}")]
    InvalidSegment { field: &'static str, value: String },

    #[error("cannot proxy request: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("cannot proxy request: {namespace}/{name} is not a valid Tempo resource")]
    InstanceNotFound { namespace: String, name: String },

    #[error("cannot proxy request: {0}")]
    Build(#[from] BuildError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingNamespace
            | ProxyError::MissingName
            | ProxyError::InvalidSegment { .. } => StatusCode::BAD_REQUEST,
            ProxyError::InstanceNotFound { .. } => StatusCode::NOT_FOUND,
            ProxyError::Discovery(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ProxyError::Discovery(_) | ProxyError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(status = status.as_u16(), error = %self, "Proxy request failed");

        match &self {
            ProxyError::InstanceNotFound { .. } => {
                ApiResponse::error(Some("TempoInstanceNotFound"), &self).into_response_with(status)
            }
            ProxyError::Discovery(e) if e.is_not_found() => {
                ApiResponse::error(Some("TempoCRDNotFound"), &self).into_response_with(status)
            }
            _ => (status, self.to_string()).into_response(),
        }
    }
}
