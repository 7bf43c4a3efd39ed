//! Proxy request path parsing.
//!
//! # Responsibilities
//! - Split `/proxy/{namespace}/{name}/{tenant}/{rest...}` into its parts
//! - Percent-decode the routing segments
//! - Keep the remainder encoded so the backend sees the bytes the browser sent
//!
//! # Design Decisions
//! - The tenant segment may be empty (`/proxy/ns/n//api`) or missing (`/proxy/ns/n`)
//! - Missing namespace or name are reported by the router, not here

use percent_encoding::percent_decode_str;

pub const PROXY_PREFIX: &str = "/proxy";

/// Routing coordinates and backend path extracted from a proxy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyPath {
    pub namespace: String,
    pub name: String,
    pub tenant: String,
    /// Rooted path forwarded to the backend, still percent-encoded.
    pub rest: String,
}

impl ProxyPath {
    /// Parse a raw (encoded) request path below [`PROXY_PREFIX`].
    pub fn parse(path: &str) -> Self {
        let tail = path.strip_prefix(PROXY_PREFIX).unwrap_or(path);
        let tail = tail.strip_prefix('/').unwrap_or(tail);

        let mut parts = tail.splitn(4, '/');
        let namespace = decode(parts.next());
        let name = decode(parts.next());
        let tenant = decode(parts.next());
        let rest = format!("/{}", parts.next().unwrap_or(""));

        Self {
            namespace,
            name,
            tenant,
            rest,
        }
    }
}

fn decode(segment: Option<&str>) -> String {
    segment
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .unwrap_or_default()
}
