use std::time::Duration;

use moka::sync::Cache;

/// Upper bound on cached responses across all tenants.
const MAX_ENTRIES: u64 = 10_000;

/// Read-through cache for JSON responses, keyed by request path.
///
/// Entries expire after `ttl`; tenant writes drop everything under the
/// tenant's path prefix. A zero TTL turns caching off.
pub struct QueryCache {
    inner: Option<Cache<String, serde_json::Value>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .support_invalidation_closures()
                .build()
        });
        Self { inner }
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.as_ref()?.get(key)
    }

    pub fn insert(&self, key: impl Into<String>, value: serde_json::Value) {
        if let Some(cache) = &self.inner {
            cache.insert(key.into(), value);
        }
    }

    /// Entries under `prefix` stop being served immediately; moka evicts them
    /// in the background.
    pub fn invalidate_prefix(&self, prefix: &str) {
        let Some(cache) = &self.inner else {
            return;
        };
        let prefix = prefix.to_string();
        if let Err(e) = cache.invalidate_entries_if(move |key, _| key.starts_with(&prefix)) {
            tracing::warn!("Falling back to a full cache flush: {}", e);
            cache.invalidate_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_after_insert() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert("/api/options", json!({"industries": []}));

        assert_eq!(cache.get("/api/options"), Some(json!({"industries": []})));
        assert_eq!(cache.get("/api/missing"), None);
    }

    #[test]
    fn test_expired_entries_are_not_served() {
        let cache = QueryCache::new(Duration::from_millis(10));
        cache.insert("key", json!(1));
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(cache.get("key"), None);
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.insert("key", json!(1));
        assert_eq!(cache.get("key"), None);
        cache.invalidate_prefix("k");
    }

    #[test]
    fn test_invalidate_prefix_only_touches_that_tenant() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert("/api/tenants/a/analytics?from=1", json!(1));
        cache.insert("/api/tenants/a/tools", json!(2));
        cache.insert("/api/tenants/b/analytics?from=1", json!(3));

        cache.invalidate_prefix("/api/tenants/a/");

        assert_eq!(cache.get("/api/tenants/a/analytics?from=1"), None);
        assert_eq!(cache.get("/api/tenants/a/tools"), None);
        assert_eq!(cache.get("/api/tenants/b/analytics?from=1"), Some(json!(3)));
    }

    #[test]
    fn test_writes_after_invalidation_are_served() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert("/api/tenants/a/tools", json!(1));
        cache.invalidate_prefix("/api/tenants/a/");

        cache.insert("/api/tenants/a/tools", json!(2));
        assert_eq!(cache.get("/api/tenants/a/tools"), Some(json!(2)));
    }
}
