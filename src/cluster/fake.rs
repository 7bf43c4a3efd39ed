//! In-memory lister for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use kube::api::{ApiResource, DynamicObject};
use kube::core::ErrorResponse;
use serde_json::Value;

use super::ResourceLister;

/// Serves canned objects keyed by resource plural and counts LIST calls.
#[derive(Default)]
pub struct FakeLister {
    objects: Mutex<HashMap<String, Vec<DynamicObject>>>,
    failures: Mutex<HashMap<String, u16>>,
    calls: AtomicUsize,
}

impl FakeLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, plural: &str, docs: Vec<Value>) -> Self {
        let objects = docs
            .into_iter()
            .map(|doc| serde_json::from_value(doc).expect("valid DynamicObject"))
            .collect();
        self.objects
            .lock()
            .unwrap()
            .insert(plural.to_string(), objects);
        self
    }

    /// Make every LIST of `plural` fail with the given API status code.
    pub fn failing(self, plural: &str, code: u16) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(plural.to_string(), code);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceLister for FakeLister {
    async fn list(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, kube::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // suspend like a real API call so concurrent callers interleave
        tokio::task::yield_now().await;
        if let Some(code) = self.failures.lock().unwrap().get(&resource.plural) {
            return Err(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: format!("{} unavailable", resource.plural),
                reason: if *code == 404 { "NotFound" } else { "ServiceUnavailable" }.to_string(),
                code: *code,
            }));
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(&resource.plural)
            .cloned()
            .unwrap_or_default())
    }
}

/// A `TempoStack` document with the given `spec`.
pub fn tempostack(namespace: &str, name: &str, spec: Value) -> Value {
    serde_json::json!({
        "apiVersion": "tempo.grafana.com/v1alpha1",
        "kind": "TempoStack",
        "metadata": { "namespace": namespace, "name": name },
        "spec": spec,
    })
}

/// A `TempoMonolithic` document with the given `spec`.
pub fn tempomonolithic(namespace: &str, name: &str, spec: Value) -> Value {
    serde_json::json!({
        "apiVersion": "tempo.grafana.com/v1alpha1",
        "kind": "TempoMonolithic",
        "metadata": { "namespace": namespace, "name": name },
        "spec": spec,
    })
}
