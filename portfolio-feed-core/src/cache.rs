//! Time-boxed memoization of query results.
//!
//! A [`TtlCache`] is created once per process and shared by `Arc` with every
//! caller that should see the same results. Each key owns an async mutex, so
//! concurrent callers asking for the same key while it is being filled wait
//! for the one in-flight producer instead of each hitting the network.
//!
//! Entries are served only while `now - stored_at < ttl`; an expired entry is
//! refilled on the next read and never returned.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::debug;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

type Slot<V> = Arc<AsyncMutex<Option<Entry<V>>>>;

pub struct TtlCache<V> {
    default_ttl: Duration,
    slots: Mutex<HashMap<String, Slot<V>>>,
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("default_ttl", &self.default_ttl)
            .field("keys", &self.len())
            .finish()
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn slot(&self, key: &str) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.to_string()).or_default().clone()
    }

    /// Returns the cached value for `key` if still fresh, otherwise runs `producer` and stores its result.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let result = self
            .get_or_try_fetch(key, ttl, move || async move { Ok::<V, Infallible>(producer().await) })
            .await;
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch) for fallible producers. Errors are returned to
    /// the caller and leave the slot empty so the next call retries.
    pub async fn get_or_try_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref() {
            if entry.stored_at.elapsed() < ttl {
                debug!(key, "cache hit");
                return Ok(entry.value.clone());
            }
            debug!(key, "cache entry expired");
        } else {
            debug!(key, "cache miss");
        }

        let value = producer().await?;
        *guard = Some(Entry {
            value: value.clone(),
            stored_at: Instant::now(),
        });
        Ok(value)
    }

    /// Fresh value for `key`, if any, without filling.
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        let slot = self.slot(key);
        let guard = slot.lock().await;
        guard
            .as_ref()
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| entry.value.clone())
    }

    pub fn invalidate(&self, key: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.clear();
    }
}

impl<V> TtlCache<V> {
    /// Number of keys ever filled or requested (expired entries included).
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
