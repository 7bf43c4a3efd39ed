//! Kubernetes cluster access.
//!
//! # Data Flow
//! ```text
//! registry (per Tempo kind)
//!     → ResourceLister::list(ApiResource)
//!     → kube::Api<DynamicObject>::list (all namespaces)
//!     → Vec<DynamicObject> handed back untouched
//! ```
//!
//! # Design Decisions
//! - Objects stay semi-structured; the registry owns all field extraction
//! - The lister is a trait object so discovery can run against fixtures
//! - No caching or watching: every call is a fresh LIST

pub mod client;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{KubeLister, ResourceLister};
