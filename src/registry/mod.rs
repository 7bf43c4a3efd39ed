//! Tempo instance discovery.
//!
//! # Data Flow
//! ```text
//! list_instances()
//!     → LIST tempostacks        (cluster API)
//!     → LIST tempomonolithics   (cluster API)
//!     → per object: kind check → tenancy.rs (read tenants)
//!     → drop objects that fail extraction (logged)
//!     → drop objects without tenants (logged)
//!     → Vec<TempoInstance>, TempoStacks first, API order kept
//! ```
//!
//! # Design Decisions
//! - Stateless: every call re-lists the cluster
//! - A failed LIST aborts the call; a malformed object never does
//! - Single-tenant instances are not reported through this listing

pub mod fields;
pub mod instance;
pub mod tenancy;

use std::sync::Arc;

use kube::api::DynamicObject;
use kube::ResourceExt;
use serde_json::Value;
use thiserror::Error;

use crate::cluster::ResourceLister;
use crate::observability::metrics;

pub use instance::{InstanceKind, TempoInstance};
pub use tenancy::{read_tenants, SUPPORTED_TENANCY_MODE};

/// Listing a Tempo resource category failed.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot list {resource} resource: {source}")]
    List {
        resource: &'static str,
        #[source]
        source: kube::Error,
    },
}

impl DiscoveryError {
    /// True when the API server does not know the resource type, which means
    /// the Tempo CRDs are not installed.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DiscoveryError::List { source: kube::Error::Api(status), .. } if status.code == 404
        )
    }
}

/// Why a single resource was left out of the listing.
#[derive(Debug, Error)]
pub enum TenancyError {
    #[error("invalid Tempo resource with kind '{0}'")]
    UnsupportedKind(String),

    #[error("multitenancy mode '{0}' is not supported")]
    UnsupportedMode(String),

    #[error("{path} accessor error: found {actual}, expected {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid tenant spec: {0}")]
    InvalidTenant(Value),

    #[error("tenantName not found in tenant spec: {0}")]
    MissingTenantName(Value),

    #[error("tenantName is not a string in tenant spec: {0}")]
    TenantNameNotString(Value),

    #[error("tenantName is empty in tenant spec: {0}")]
    EmptyTenantName(Value),
}

impl TenancyError {
    /// Metric label for skipped resources.
    pub fn reason(&self) -> &'static str {
        match self {
            TenancyError::UnsupportedKind(_) => "unsupported_kind",
            TenancyError::UnsupportedMode(_) => "unsupported_mode",
            _ => "malformed",
        }
    }
}

/// Discovers Tempo instances through a [`ResourceLister`].
#[derive(Clone)]
pub struct Registry {
    lister: Arc<dyn ResourceLister>,
}

impl Registry {
    pub fn new(lister: Arc<dyn ResourceLister>) -> Self {
        Self { lister }
    }

    /// List all multi-tenant Tempo instances in the cluster.
    pub async fn list_instances(&self) -> Result<Vec<TempoInstance>, DiscoveryError> {
        let mut instances = Vec::new();
        for kind in InstanceKind::ALL {
            instances.extend(self.list_kind(kind).await?);
        }

        metrics::record_discovery(instances.len());
        Ok(instances)
    }

    async fn list_kind(&self, kind: InstanceKind) -> Result<Vec<TempoInstance>, DiscoveryError> {
        let objects = self
            .lister
            .list(&kind.api_resource())
            .await
            .map_err(|source| DiscoveryError::List {
                resource: kind.plural(),
                source,
            })?;

        Ok(objects.iter().filter_map(|obj| describe(kind, obj)).collect())
    }
}

fn describe(listed: InstanceKind, obj: &DynamicObject) -> Option<TempoInstance> {
    let namespace = obj.namespace().unwrap_or_default();
    let name = obj.name_any();

    let (kind, tenants) = match resolve_tenancy(listed, obj) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(namespace = %namespace, tempo = %name, error = %e, "Skipping Tempo instance");
            metrics::record_discovery_skip(e.reason());
            return None;
        }
    };

    if tenants.is_empty() {
        tracing::debug!(namespace = %namespace, tempo = %name, "Skipping Tempo instance without multi-tenancy");
        metrics::record_discovery_skip("single_tenant");
        return None;
    }

    Some(TempoInstance {
        kind,
        namespace,
        name,
        tenants,
    })
}

fn resolve_tenancy(
    listed: InstanceKind,
    obj: &DynamicObject,
) -> Result<(InstanceKind, Vec<String>), TenancyError> {
    // List items normally carry their own kind; fall back to the listed category.
    let kind = match obj.types.as_ref() {
        Some(types) if !types.kind.is_empty() => types.kind.parse()?,
        _ => listed,
    };
    let tenants = read_tenants(kind, &obj.data)?;
    Ok((kind, tenants))
}
