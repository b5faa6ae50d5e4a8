//! Query Cache
//!
//! Revalidate-on-demand result cache keyed by string. `load` returns the cached
//! entry while it is within the dedupe interval and fetches otherwise;
//! `revalidate` always fetches.

use crate::erp::ErpError;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entries younger than this are served without a network call
pub const DEFAULT_DEDUPE_INTERVAL: Duration = Duration::from_secs(2);

/// Cached outcome of the last fetch for one key
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Last successful value; kept when a later fetch fails
    pub data: Option<Value>,
    /// Error of the last fetch, cleared by the next success
    pub error: Option<Arc<ErpError>>,
    pub updated_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, interval: Duration) -> bool {
        self.updated_at.elapsed() < interval
    }
}

/// Key/value cache for fetched documents and lists
#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<String, CacheEntry>,
    dedupe_interval: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUPE_INTERVAL)
    }
}

impl QueryCache {
    pub fn new(dedupe_interval: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            dedupe_interval,
        }
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Fetch only if the key is missing or stale
    pub async fn load<F, Fut>(&mut self, key: &str, fetcher: F) -> &CacheEntry
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ErpError>>,
    {
        let fresh = self
            .entries
            .get(key)
            .map(|e| e.is_fresh(self.dedupe_interval))
            .unwrap_or(false);

        if fresh {
            tracing::trace!("Cache hit for {}", key);
        } else {
            self.revalidate(key, fetcher).await;
        }

        &self.entries[key]
    }

    /// Fetch unconditionally and store the outcome before returning it
    pub async fn revalidate<F, Fut>(&mut self, key: &str, fetcher: F) -> &CacheEntry
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ErpError>>,
    {
        tracing::debug!("Fetching {}", key);
        let result = fetcher().await;

        let entry = self.entries.entry(key.to_string()).or_insert_with(|| CacheEntry {
            data: None,
            error: None,
            updated_at: Instant::now(),
        });

        match result {
            Ok(value) => {
                entry.data = Some(value);
                entry.error = None;
            },
            Err(e) => {
                tracing::debug!("Fetch for {} failed: {}", key, e);
                entry.error = Some(Arc::new(e));
            },
        }
        entry.updated_at = Instant::now();

        entry
    }

    /// Drop one key
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every key that starts with `prefix` (e.g. all lists of a doctype)
    pub fn invalidate_prefix(&mut self, prefix: &str) {
        self.entries.retain(|k, _| !k.starts_with(prefix));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
