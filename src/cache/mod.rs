//! Render cache for time-based revalidation
//!
//! Rendered pages are kept per route key together with the instant they were
//! rendered. A page younger than its route's lifetime is served as is; an
//! older one is re-rendered, and kept around so it can still be served if the
//! re-render fails.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A rendered page and when it was produced
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub html: String,
    pub rendered_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.rendered_at) < ttl
    }
}

/// Route key to rendered page
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached page for `key` if it was rendered less than `ttl` ago
    pub async fn fresh(&self, key: &str, ttl: Duration) -> Option<String> {
        self.fresh_at(key, ttl, Instant::now()).await
    }

    async fn fresh_at(&self, key: &str, ttl: Duration, now: Instant) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(ttl, now))
            .map(|entry| entry.html.clone())
    }

    /// The cached page for `key` regardless of age
    pub async fn stale(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.html.clone())
    }

    pub async fn store(&self, key: impl Into<String>, html: String) {
        let key = key.into();
        tracing::debug!("Cached {}", key);
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                html,
                rendered_at: Instant::now(),
            },
        );
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
