//! In-memory caching for config lookups.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

/// A cached decode result. `None` records that the endpoint answered with
/// a body that did not decode, so the miss is not retried every call.
type CachedBody = Option<Value>;

#[derive(Debug, Clone)]
struct CacheEntry {
    body: CachedBody,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    ttl: Duration,
}

/// Thread-safe TTL cache keyed by request URL.
///
/// Used only for the config endpoints; telemetry fetches always hit the
/// router so the history stays live.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    /// Cache with the default TTL of 5 minutes.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(300))
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Cached body for the URL, when present and unexpired.
    pub async fn get(&self, url: &str) -> Option<CachedBody> {
        let store = self.inner.read().await;
        store.map.get(url).and_then(|entry| {
            (Instant::now() <= entry.expires_at).then(|| entry.body.clone())
        })
    }

    /// Store a body for the URL. No-op when the cache is disabled.
    pub async fn put(&self, url: &str, body: CachedBody) {
        let mut store = self.inner.write().await;
        if store.ttl == Duration::ZERO {
            return;
        }
        let expires_at = Instant::now() + store.ttl;
        store
            .map
            .insert(url.to_owned(), CacheEntry { body, expires_at });
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
