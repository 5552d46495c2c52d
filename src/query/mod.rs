//! Shared cache of list reads
//!
//! Each list is cached under a string key (the entity's API endpoint, or
//! `exercises` for the grouped listing). Writes invalidate keys; the next read
//! of an invalidated key refetches exactly once.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Error;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    fetches: HashMap<String, usize>,
}

/// Cache of list responses keyed by query key
#[derive(Debug, Clone)]
pub struct QueryCache {
    state: Arc<RwLock<CacheState>>,
    retries: u32,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(1)
    }
}

impl QueryCache {
    /// A cache retrying each failed read `retries` times
    pub fn new(retries: u32) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
            retries,
        }
    }

    /// The cached value for `key`, or the result of `fetch` when absent or stale
    ///
    /// A failed fetch is retried, except on `Unauthorized`. The cache is left
    /// unchanged when every attempt fails.
    pub async fn fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Value, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Value, Error>>,
    {
        {
            let state = self.state.read().await;
            if let Some(entry) = state.entries.get(key).filter(|entry| !entry.stale) {
                debug!(key, "query cache hit");
                return Ok(entry.data.clone());
            }
        }

        let mut attempt = 0;
        let data = loop {
            attempt += 1;
            match fetch().await {
                Ok(data) => break data,
                Err(e) if e.is_unauthorized() || attempt > self.retries => return Err(e),
                Err(e) => warn!(key, attempt, error = %e, "query failed, retrying"),
            }
        };

        let mut state = self.state.write().await;
        *state.fetches.entry(key.to_string()).or_default() += 1;
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                data: data.clone(),
                stale: false,
            },
        );
        Ok(data)
    }

    /// Drop any cached value for `key` and fetch it again
    pub async fn refetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Value, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Value, Error>>,
    {
        self.invalidate(key).await;
        self.fetch(key, fetch).await
    }

    /// Mark `key` stale so the next read refetches
    pub async fn invalidate(&self, key: &str) {
        let mut state = self.state.write().await;
        if let Some(entry) = state.entries.get_mut(key) {
            debug!(key, "query invalidated");
            entry.stale = true;
        }
    }

    pub async fn invalidate_all<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.invalidate(key.as_ref()).await;
        }
    }

    /// The cached value regardless of staleness
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.state.read().await.entries.get(key).map(|entry| entry.data.clone())
    }

    pub async fn is_stale(&self, key: &str) -> bool {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .map(|entry| entry.stale)
            .unwrap_or(true)
    }

    /// Number of successful fetches stored for `key`
    pub async fn fetch_count(&self, key: &str) -> usize {
        self.state.read().await.fetches.get(key).copied().unwrap_or(0)
    }

    /// Drop every cached list; fetch counts are kept
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn hits_do_not_refetch() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!([1, 2]))
        };

        cache.fetch("users", fetch).await.unwrap();
        cache.fetch("users", fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.fetch_count("users").await, 1);
    }

    #[tokio::test]
    async fn invalidation_causes_one_refetch() {
        let cache = QueryCache::default();
        cache.fetch("users", || async { Ok(json!([])) }).await.unwrap();
        cache.invalidate_all(["users", "exercises"]).await;
        assert!(cache.is_stale("users").await);

        cache.fetch("users", || async { Ok(json!([1])) }).await.unwrap();
        let data = cache.fetch("users", || async { Ok(json!([1, 2])) }).await.unwrap();
        assert_eq!(data, json!([1]));
        assert_eq!(cache.fetch_count("users").await, 2);
    }

    #[tokio::test]
    async fn failed_reads_are_retried_once() {
        let cache = QueryCache::new(1);
        let calls = AtomicUsize::new(0);
        let result = cache
            .fetch("child-users", || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::general("boom"))
                } else {
                    Ok(json!(["ok"]))
                }
            })
            .await;
        assert_eq!(result.unwrap(), json!(["ok"]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let calls = AtomicUsize::new(0);
        let result = cache
            .fetch("exercises", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::general("still down"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get("exercises").await, None);
    }

    #[tokio::test]
    async fn unauthorized_is_not_retried() {
        let cache = QueryCache::new(3);
        let calls = AtomicUsize::new(0);
        let result = cache
            .fetch("users", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Unauthorized)
            })
            .await;
        assert!(matches!(result, Err(Error::Unauthorized)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
