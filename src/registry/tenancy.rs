//! Tenancy extraction from Tempo custom resources.
//!
//! # Field Layout
//! ```text
//! TempoStack:      spec.tenants.mode
//!                  spec.tenants.authentication[].tenantName
//! TempoMonolithic: spec.multitenancy.enabled
//!                  spec.multitenancy.mode
//!                  spec.multitenancy.authentication[].tenantName
//! ```

use serde_json::Value;

use super::fields::{nested_bool, nested_slice, nested_str};
use super::{InstanceKind, TenancyError};

/// The only multitenancy mode the gateway routing understands.
pub const SUPPORTED_TENANCY_MODE: &str = "openshift";

/// Read the tenant names of a resource's `spec`, in declaration order.
///
/// An empty list means the instance runs without multitenancy.
pub fn read_tenants(kind: InstanceKind, doc: &Value) -> Result<Vec<String>, TenancyError> {
    match kind {
        InstanceKind::Clustered => {
            if !validate_tenancy_mode(doc, &["spec", "tenants", "mode"])? {
                return Ok(Vec::new());
            }
            extract_tenant_names(doc, &["spec", "tenants", "authentication"])
        }
        InstanceKind::Monolithic => {
            let enabled = nested_bool(doc, &["spec", "multitenancy", "enabled"])?.unwrap_or(false);
            if !enabled {
                return Ok(Vec::new());
            }
            // mode is required once multitenancy is enabled
            if !validate_tenancy_mode(doc, &["spec", "multitenancy", "mode"])? {
                return Ok(Vec::new());
            }
            extract_tenant_names(doc, &["spec", "multitenancy", "authentication"])
        }
    }
}

/// Returns `false` when no mode is set, `true` for the supported mode.
fn validate_tenancy_mode(doc: &Value, path: &[&str]) -> Result<bool, TenancyError> {
    match nested_str(doc, path)? {
        None => Ok(false),
        Some(SUPPORTED_TENANCY_MODE) => Ok(true),
        Some(mode) => Err(TenancyError::UnsupportedMode(mode.to_string())),
    }
}

fn extract_tenant_names(doc: &Value, path: &[&str]) -> Result<Vec<String>, TenancyError> {
    let Some(tenants) = nested_slice(doc, path)? else {
        return Ok(Vec::new());
    };

    tenants
        .iter()
        .map(|tenant| {
            let spec = tenant
                .as_object()
                .ok_or_else(|| TenancyError::InvalidTenant(tenant.clone()))?;
            let name = spec
                .get("tenantName")
                .ok_or_else(|| TenancyError::MissingTenantName(tenant.clone()))?
                .as_str()
                .ok_or_else(|| TenancyError::TenantNameNotString(tenant.clone()))?;
            if name.is_empty() {
                return Err(TenancyError::EmptyTenantName(tenant.clone()));
            }
            Ok(name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stack(spec: Value) -> Value {
        json!({ "spec": spec })
    }

    #[test]
    fn test_stack_without_tenants_is_single_tenant() {
        let doc = stack(json!({"storage": {"secret": {"name": "s3"}}}));
        assert!(read_tenants(InstanceKind::Clustered, &doc).unwrap().is_empty());
    }

    #[test]
    fn test_stack_tenants_in_declaration_order() {
        let doc = stack(json!({
            "tenants": {
                "mode": "openshift",
                "authentication": [
                    {"tenantName": "prod", "tenantId": "1"},
                    {"tenantName": "dev", "tenantId": "2"},
                ]
            }
        }));
        assert_eq!(
            read_tenants(InstanceKind::Clustered, &doc).unwrap(),
            vec!["prod".to_string(), "dev".to_string()]
        );
    }

    #[test]
    fn test_stack_unsupported_mode() {
        let doc = stack(json!({"tenants": {"mode": "static", "authentication": []}}));
        assert!(matches!(
            read_tenants(InstanceKind::Clustered, &doc),
            Err(TenancyError::UnsupportedMode(m)) if m == "static"
        ));
    }

    #[test]
    fn test_stack_mode_without_authentication() {
        let doc = stack(json!({"tenants": {"mode": "openshift"}}));
        assert!(read_tenants(InstanceKind::Clustered, &doc).unwrap().is_empty());
    }

    #[test]
    fn test_monolithic_disabled_ignores_mode() {
        let doc = stack(json!({
            "multitenancy": {"enabled": false, "mode": "static"}
        }));
        assert!(read_tenants(InstanceKind::Monolithic, &doc).unwrap().is_empty());
    }

    #[test]
    fn test_monolithic_enabled() {
        let doc = stack(json!({
            "multitenancy": {
                "enabled": true,
                "mode": "openshift",
                "authentication": [{"tenantName": "team-a"}]
            }
        }));
        assert_eq!(
            read_tenants(InstanceKind::Monolithic, &doc).unwrap(),
            vec!["team-a".to_string()]
        );
    }

    #[test]
    fn test_monolithic_enabled_without_mode() {
        let doc = stack(json!({
            "multitenancy": {"enabled": true, "authentication": [{"tenantName": "a"}]}
        }));
        assert!(read_tenants(InstanceKind::Monolithic, &doc).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_tenant_entries() {
        let cases = [
            (json!(["prod"]), "invalid tenant spec"),
            (json!([{"tenantId": "1"}]), "tenantName not found"),
            (json!([{"tenantName": 7}]), "tenantName is not a string"),
            (json!([{"tenantName": ""}]), "tenantName is empty"),
        ];
        for (authentication, expected) in cases {
            let doc = stack(json!({
                "tenants": {"mode": "openshift", "authentication": authentication}
            }));
            let err = read_tenants(InstanceKind::Clustered, &doc).unwrap_err();
            assert!(
                err.to_string().starts_with(expected),
                "{err} should start with {expected}"
            );
        }
    }

    #[test]
    fn test_wrong_typed_enabled_flag() {
        let doc = stack(json!({"multitenancy": {"enabled": "true"}}));
        assert!(matches!(
            read_tenants(InstanceKind::Monolithic, &doc),
            Err(TenancyError::WrongType { .. })
        ));
    }
}
