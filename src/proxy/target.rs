//! Destination URL construction.
//!
//! # Rules
//! ```text
//! tenant set  → https://tempo-<name>-gateway.<ns>.svc:8080/api/traces/v1/<tenant>/tempo
//! no tenant   → http://tempo-<name>-query-frontend.<ns>.svc:3200   (TempoStack)
//!               http://tempo-<name>.<ns>.svc:3200                  (TempoMonolithic)
//! ```

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::registry::{InstanceKind, TempoInstance};

/// Gateway port (TLS, tenant-aware).
pub const GATEWAY_PORT: u16 = 8080;

/// Query port (plaintext, single tenant).
pub const QUERY_PORT: u16 = 3200;

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b',')
    .add(b';')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Build the base URL requests for `tenant` on `instance` are forwarded to.
pub fn target_url(instance: &TempoInstance, tenant: &str) -> Result<Url, url::ParseError> {
    let namespace = &instance.namespace;
    let raw = if tenant.is_empty() {
        let service = match instance.kind {
            InstanceKind::Clustered => dns_name(&format!("tempo-{}-query-frontend", instance.name)),
            InstanceKind::Monolithic => dns_name(&format!("tempo-{}", instance.name)),
        };
        format!("http://{service}.{namespace}.svc:{QUERY_PORT}")
    } else {
        let service = dns_name(&format!("tempo-{}-gateway", instance.name));
        let tenant = utf8_percent_encode(tenant, PATH_SEGMENT);
        format!("https://{service}.{namespace}.svc:{GATEWAY_PORT}/api/traces/v1/{tenant}/tempo")
    };
    Url::parse(&raw)
}

/// Normalize a service name into a DNS label: lowercase, anything outside
/// `[a-z0-9-]` becomes `-`, no leading or trailing `-`.
pub fn dns_name(name: &str) -> String {
    let normalized: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect();
    normalized.trim_matches('-').to_string()
}

/// Join the target's base path with the stripped request path and carry
/// over the query string.
pub fn upstream_url(base: &Url, path: &str, query: Option<&str>) -> Url {
    let mut url = base.clone();
    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(query);
    url
}
