//! Resolution of routing keys to cached proxies.

use std::net::IpAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use super::cache::{ProxyCache, RouteKey};
use super::target::target_url;
use super::transport::{build_client, BuildError, UpstreamSettings};
use super::upstream::TempoProxy;
use super::ProxyError;
use crate::observability::metrics;
use crate::registry::{Registry, TempoInstance};

/// Owns the proxy cache and builds proxies from discovered instances.
pub struct ProxyRouter {
    registry: Registry,
    cache: ProxyCache,
    upstream: UpstreamSettings,
}

impl ProxyRouter {
    pub fn new(registry: Registry, upstream: UpstreamSettings, capacity: u64) -> Self {
        Self {
            registry,
            cache: ProxyCache::new(capacity),
            upstream,
        }
    }

    pub fn cache(&self) -> &ProxyCache {
        &self.cache
    }

    /// Resolve `key` and forward `request` to it with `path` as the rooted
    /// backend path.
    pub async fn route(
        &self,
        key: &RouteKey<'_>,
        path: &str,
        request: Request<Body>,
        client_addr: Option<IpAddr>,
    ) -> Result<Response, ProxyError> {
        let proxy = self.resolve(key).await?;
        Ok(proxy.forward(request, path, client_addr).await)
    }

    /// Return the cached proxy for `key`, building it on a miss.
    pub async fn resolve(&self, key: &RouteKey<'_>) -> Result<Arc<TempoProxy>, ProxyError> {
        if key.namespace.is_empty() {
            return Err(ProxyError::MissingNamespace);
        }
        if key.name.is_empty() {
            return Err(ProxyError::MissingName);
        }
        // `/` separates the flattened key, so it must not occur in either
        for (field, value) in [("namespace", key.namespace), ("name", key.name)] {
            if value.contains('/') {
                return Err(ProxyError::InvalidSegment {
                    field,
                    value: value.to_string(),
                });
            }
        }

        let cache_key = key.flatten();
        if let Some(proxy) = self.cache.get(&cache_key) {
            metrics::record_cache_lookup(true);
            return Ok(proxy);
        }
        metrics::record_cache_lookup(false);

        let instance = self.lookup(key.namespace, key.name).await?;
        let proxy = Arc::new(self.build(&instance, key.tenant).await?);
        self.cache.insert(cache_key, proxy.clone());
        Ok(proxy)
    }

    async fn lookup(&self, namespace: &str, name: &str) -> Result<TempoInstance, ProxyError> {
        self.registry
            .list_instances()
            .await?
            .into_iter()
            .find(|instance| instance.namespace == namespace && instance.name == name)
            .ok_or_else(|| ProxyError::InstanceNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn build(&self, instance: &TempoInstance, tenant: &str) -> Result<TempoProxy, BuildError> {
        let target = target_url(instance, tenant)?;
        let client = build_client(&self.upstream).await?;

        metrics::record_proxy_build();
        tracing::info!(
            namespace = %instance.namespace,
            tempo = %instance.name,
            tenant = %tenant,
            upstream = %target,
            "Created proxy"
        );
        Ok(TempoProxy::new(target, client))
    }
}
