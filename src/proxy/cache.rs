//! Bounded cache of constructed proxies.
//!
//! # Design Decisions
//! - Keyed by the flattened `(namespace, name, tenant)` triple
//! - Least-recently-used eviction at a fixed capacity; no TTL and no
//!   explicit invalidation, so an entry keeps its coordinates until evicted
//! - Concurrent inserts for the same key: the last writer wins

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use super::upstream::TempoProxy;

pub const DEFAULT_CAPACITY: u64 = 128;

/// Identity of a proxy endpoint. The tenant may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteKey<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
    pub tenant: &'a str,
}

impl<'a> RouteKey<'a> {
    pub fn new(namespace: &'a str, name: &'a str, tenant: &'a str) -> Self {
        Self {
            namespace,
            name,
            tenant,
        }
    }

    /// Slashes are not allowed in namespace or name, so `/` cannot collide.
    pub fn flatten(&self) -> String {
        format!("{}/{}/{}", self.namespace, self.name, self.tenant)
    }
}

#[derive(Clone)]
pub struct ProxyCache {
    inner: Cache<String, Arc<TempoProxy>>,
}

impl ProxyCache {
    pub fn new(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { inner }
    }

    pub fn get(&self, key: &str) -> Option<Arc<TempoProxy>> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: String, proxy: Arc<TempoProxy>) {
        self.inner.insert(key, proxy);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Entry count. Only exact after [`ProxyCache::sync`].
    pub fn len(&self) -> u64 {
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply pending recency updates and evictions.
    pub fn sync(&self) {
        self.inner.run_pending_tasks();
    }
}

impl Default for ProxyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn proxy() -> Arc<TempoProxy> {
        let target = Url::parse("http://tempo-x.ns.svc:3200").unwrap();
        Arc::new(TempoProxy::new(target, reqwest::Client::new()))
    }

    #[test]
    fn test_flatten() {
        assert_eq!(RouteKey::new("obs", "prod", "team-a").flatten(), "obs/prod/team-a");
        assert_eq!(RouteKey::new("obs", "prod", "").flatten(), "obs/prod/");
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = ProxyCache::new(3);
        for key in ["a", "b", "c"] {
            cache.insert(key.to_string(), proxy());
        }
        cache.sync();

        // touch "a" so "b" becomes the oldest
        assert!(cache.get("a").is_some());
        cache.sync();

        cache.insert("d".to_string(), proxy());
        cache.sync();

        assert!(!cache.contains("b"));
        assert!(cache.contains("a"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_last_insert_wins() {
        let cache = ProxyCache::default();
        let first = proxy();
        let second = proxy();
        cache.insert("k".to_string(), first);
        cache.insert("k".to_string(), second.clone());
        cache.sync();

        assert!(Arc::ptr_eq(&cache.get("k").unwrap(), &second));
        assert_eq!(cache.len(), 1);
    }
}
