//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kube::api::{ApiResource, DynamicObject};
use kube::core::ErrorResponse;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use tempo_console_proxy::cluster::ResourceLister;

/// Request heads received by a mock backend, in arrival order.
pub type Received = Arc<Mutex<Vec<String>>>;

/// Start a backend that records each request head and answers with `response`
/// verbatim. Returns its address.
pub async fn start_mock_backend(response: &'static str) -> (SocketAddr, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received: Received = Arc::default();

    let log = received.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let log = log.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                log.lock().unwrap().push(head);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, received)
}

/// Start a backend that sends `first` as a chunk, then waits for the returned
/// sender to fire before sending `last` and ending the body.
pub async fn start_chunked_backend(
    first: &'static str,
    last: &'static str,
) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        read_head(&mut socket).await;

        let head = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Type: text/plain\r\n\r\n";
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(chunk(first).as_bytes()).await;
        let _ = socket.flush().await;

        let _ = release_rx.await;
        let _ = socket.write_all(chunk(last).as_bytes()).await;
        let _ = socket.write_all(b"0\r\n\r\n").await;
        let _ = socket.shutdown().await;
    });

    (addr, release_tx)
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

fn chunk(data: &str) -> String {
    format!("{:x}\r\n{}\r\n", data.len(), data)
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut byte).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&byte[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Cluster stand-in serving canned documents per resource plural.
#[derive(Default)]
pub struct FakeLister {
    objects: HashMap<String, Vec<DynamicObject>>,
    failures: HashMap<String, u16>,
}

impl FakeLister {
    pub fn with(mut self, plural: &str, docs: Vec<Value>) -> Self {
        let objects = docs
            .into_iter()
            .map(|doc| serde_json::from_value(doc).unwrap())
            .collect();
        self.objects.insert(plural.to_string(), objects);
        self
    }

    pub fn failing(mut self, plural: &str, code: u16) -> Self {
        self.failures.insert(plural.to_string(), code);
        self
    }
}

#[async_trait]
impl ResourceLister for FakeLister {
    async fn list(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, kube::Error> {
        if let Some(code) = self.failures.get(&resource.plural) {
            return Err(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: format!("the server could not find the requested resource ({})", resource.plural),
                reason: "NotFound".to_string(),
                code: *code,
            }));
        }
        Ok(self.objects.get(&resource.plural).cloned().unwrap_or_default())
    }
}

pub fn tempostack(namespace: &str, name: &str, tenants: &[&str]) -> Value {
    let authentication: Vec<Value> = tenants
        .iter()
        .map(|t| serde_json::json!({ "tenantName": t }))
        .collect();
    serde_json::json!({
        "apiVersion": "tempo.grafana.com/v1alpha1",
        "kind": "TempoStack",
        "metadata": { "namespace": namespace, "name": name },
        "spec": { "tenants": { "mode": "openshift", "authentication": authentication } },
    })
}
