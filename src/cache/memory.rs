//! In-process cache backend.

use crate::cache::backend::{BackendError, CacheBackend};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A thread-safe in-memory backend with per-entry TTL.
///
/// Expired entries are evicted lazily on read; natural expiry is owned by
/// the backend, exactly as it would be by an external store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<DashMap<String, (Vec<u8>, Instant)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-evicted) entries. Expired entries still count
    /// until a read evicts them.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        if let Some(entry) = self.inner.get(key) {
            let (value, expires_at) = entry.value();
            if Instant::now() < *expires_at {
                return Ok(Some(value.clone()));
            }
        } else {
            return Ok(None);
        }
        // Entry exists but has expired; drop the read guard before removal.
        self.inner.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BackendError> {
        self.inner
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.inner.remove(key);
        Ok(())
    }
}
