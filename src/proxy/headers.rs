//! Header handling for proxied traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from requests before forwarding
//! - Append the client address to X-Forwarded-For
//! - Strip connection-management and CORS headers from backend responses

use axum::http::{HeaderMap, HeaderValue};
use std::net::IpAddr;

/// Response headers never relayed to the browser. Some are forbidden by
/// HTTP/2; the CORS ones would clash with the console's own policy.
pub const FILTERED_RESPONSE_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
    "access-control-allow-headers",
    "access-control-allow-methods",
    "access-control-allow-origin",
    "access-control-expose-headers",
];

const HOP_BY_HOP_REQUEST_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn filter_response_headers(headers: &mut HeaderMap) {
    for name in FILTERED_RESPONSE_HEADERS {
        headers.remove(name);
    }
}

/// Copy of the inbound headers suitable for the upstream request.
pub fn forward_request_headers(inbound: &HeaderMap, client: Option<IpAddr>) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in HOP_BY_HOP_REQUEST_HEADERS {
        headers.remove(name);
    }
    // the client sets Host from the upstream URL
    headers.remove("host");

    if let Some(ip) = client {
        let forwarded = match inbound.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            Some(prior) => format!("{prior}, {ip}"),
            None => ip.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded) {
            headers.insert("x-forwarded-for", value);
        }
    }
    headers
}
