//! Normalized Tempo instance descriptors.

use std::fmt;
use std::str::FromStr;

use kube::api::{ApiResource, GroupVersionKind};
use serde::Serialize;

use super::TenancyError;

pub const TEMPO_GROUP: &str = "tempo.grafana.com";
pub const TEMPO_VERSION: &str = "v1alpha1";

/// The two deployment shapes of a Tempo instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InstanceKind {
    /// Multi-component deployment (`TempoStack`).
    #[serde(rename = "TempoStack")]
    Clustered,
    /// Single-component deployment (`TempoMonolithic`).
    #[serde(rename = "TempoMonolithic")]
    Monolithic,
}

impl InstanceKind {
    /// Listing order used by discovery.
    pub const ALL: [InstanceKind; 2] = [InstanceKind::Clustered, InstanceKind::Monolithic];

    pub fn as_str(self) -> &'static str {
        match self {
            InstanceKind::Clustered => "TempoStack",
            InstanceKind::Monolithic => "TempoMonolithic",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            InstanceKind::Clustered => "tempostacks",
            InstanceKind::Monolithic => "tempomonolithics",
        }
    }

    pub fn api_resource(self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(TEMPO_GROUP, TEMPO_VERSION, self.as_str());
        ApiResource::from_gvk_with_plural(&gvk, self.plural())
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceKind {
    type Err = TenancyError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "TempoStack" => Ok(InstanceKind::Clustered),
            "TempoMonolithic" => Ok(InstanceKind::Monolithic),
            other => Err(TenancyError::UnsupportedKind(other.to_string())),
        }
    }
}

/// A tenancy-resolved Tempo instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TempoInstance {
    pub kind: InstanceKind,
    pub namespace: String,
    pub name: String,
    /// Tenant names in declaration order. Empty for single-tenant instances.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tenants: Vec<String>,
}

impl TempoInstance {
    pub fn is_multitenant(&self) -> bool {
        !self.tenants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_names() {
        for kind in InstanceKind::ALL {
            assert_eq!(kind.as_str().parse::<InstanceKind>().unwrap(), kind);
        }
        assert!(matches!(
            "TempoCluster".parse::<InstanceKind>(),
            Err(TenancyError::UnsupportedKind(k)) if k == "TempoCluster"
        ));
    }

    #[test]
    fn test_api_resource() {
        let ar = InstanceKind::Monolithic.api_resource();
        assert_eq!(ar.group, "tempo.grafana.com");
        assert_eq!(ar.version, "v1alpha1");
        assert_eq!(ar.kind, "TempoMonolithic");
        assert_eq!(ar.plural, "tempomonolithics");
    }

    #[test]
    fn test_serialize_omits_empty_tenants() {
        let instance = TempoInstance {
            kind: InstanceKind::Clustered,
            namespace: "obs".into(),
            name: "prod".into(),
            tenants: vec![],
        };
        let json = serde_json::to_value(&instance).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "TempoStack", "namespace": "obs", "name": "prod"})
        );
    }
}
