//! A configured reverse proxy to one Tempo endpoint.

use std::net::IpAddr;

use axum::body::{Body, HttpBody};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::{stream, StreamExt, TryStreamExt};
use tokio::sync::mpsc;
use url::Url;

use super::headers::{filter_response_headers, forward_request_headers};
use super::target::upstream_url;
use crate::observability::metrics;

const REQUEST_BODY_BUFFER: usize = 8;

/// Destination URL plus the client that carries its TLS trust material.
#[derive(Debug)]
pub struct TempoProxy {
    target: Url,
    client: reqwest::Client,
}

impl TempoProxy {
    pub fn new(target: Url, client: reqwest::Client) -> Self {
        Self { target, client }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Forward `request` with its path replaced by `path` (already stripped of
    /// the routing prefix). Backend connection failures become a 502.
    pub async fn forward(
        &self,
        request: Request<Body>,
        path: &str,
        client_addr: Option<IpAddr>,
    ) -> Response {
        let (parts, body) = request.into_parts();
        let url = upstream_url(&self.target, path, parts.uri.query());
        let headers = forward_request_headers(&parts.headers, client_addr);

        tracing::debug!(method = %parts.method, upstream = %url, "Forwarding request");

        let mut outbound = self.client.request(parts.method, url).headers(headers);
        if body.size_hint().exact() != Some(0) {
            outbound = outbound.body(outbound_body(body));
        }

        match outbound.send().await {
            Ok(response) => relay(response),
            Err(e) => {
                tracing::error!(upstream = %self.target, error = %e, "http: proxy error");
                metrics::record_upstream_error();
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Error connecting to Tempo instance: {e}"),
                )
                    .into_response()
            }
        }
    }
}

/// Pump the inbound body through a channel; the outbound client needs a
/// `Sync` stream, which the inbound body is not. Dropping the outbound
/// request stops the pump.
fn outbound_body(body: Body) -> reqwest::Body {
    let (tx, mut rx) = mpsc::channel(REQUEST_BODY_BUFFER);
    tokio::spawn(async move {
        let mut chunks = body.into_data_stream();
        while let Some(chunk) = chunks.next().await {
            if tx.send(chunk).await.is_err() {
                break;
            }
        }
    });
    reqwest::Body::wrap_stream(stream::poll_fn(move |cx| rx.poll_recv(cx)))
}

/// Stream the backend response back, minus headers unsafe to relay.
/// Chunks are passed on as soon as they arrive.
fn relay(response: reqwest::Response) -> Response {
    let status = response.status();
    let mut headers = response.headers().clone();
    filter_response_headers(&mut headers);

    let stream = response.bytes_stream().map_err(std::io::Error::other);
    let mut relayed = Response::new(Body::from_stream(stream));
    *relayed.status_mut() = status;
    *relayed.headers_mut() = headers;
    relayed
}
