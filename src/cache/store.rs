//! Typed cache-aside store.
//!
//! # Responsibilities
//! - Derive keys from the cached value's runtime type and id
//! - Run every backend call under the resilient executor with each attempt
//!   clamped to a short cache-call deadline, so slow reads are recorded
//!   timeout samples and sustained slowness opens the circuit
//! - Degrade every failure to a cache miss; the cache is an optimization,
//!   not a correctness boundary
//!
//! # Design Decisions
//! - `get`/`set`/`remove` never return errors to the caller
//! - Writes use the caller-supplied TTL or the configured default (5 min)
//! - `get_or_fetch` is the read-through sequence every call site would
//!   otherwise hand-roll: get, fetch on miss, set, return

use crate::cache::backend::CacheBackend;
use crate::config::schema::{CacheConfig, DEFAULT_PIPELINE};
use crate::error::CallError;
use crate::observability::metrics;
use crate::resilience::ResilientExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Final path segment of the type name, used as the cache key prefix.
///
/// Derived from the runtime type identity of the cached value so distinct
/// types can never collide on one key.
fn type_tag<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Cache key for a `T` with the given id: `"{TypeName}_{Id}"`.
pub fn cache_key<T, I>(id: &I) -> String
where
    I: Display + ?Sized,
{
    format!("{}_{}", type_tag::<T>(), id)
}

/// Read-through/write-through wrapper over a key-value cache.
#[derive(Clone)]
pub struct CacheStore {
    executor: ResilientExecutor,
    backend: Arc<dyn CacheBackend>,
    default_ttl: Duration,
    call_deadline: Duration,
}

impl CacheStore {
    pub fn new(
        executor: ResilientExecutor,
        backend: Arc<dyn CacheBackend>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            executor,
            backend,
            default_ttl: Duration::from_secs(config.default_ttl_secs),
            call_deadline: Duration::from_millis(config.call_deadline_ms),
        }
    }

    /// Look up a `T` by id. Any failure (timeout, circuit open, backend
    /// error, undecodable payload) reads as a miss.
    pub async fn get<T, I>(&self, id: &I) -> Option<T>
    where
        T: DeserializeOwned,
        I: Display + ?Sized,
    {
        let key = cache_key::<T, I>(id);

        let backend = self.backend.clone();
        let lookup = self
            .executor
            .execute_capped(DEFAULT_PIPELINE, self.call_deadline, || {
                let backend = backend.clone();
                let key = key.clone();
                async move {
                    backend
                        .get(&key)
                        .await
                        .map_err(|e| CallError::Transient(e.to_string()))
                }
            })
            .await;

        let bytes = match lookup {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                metrics::record_cache_lookup(type_tag::<T>(), false);
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                metrics::record_cache_lookup(type_tag::<T>(), false);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                metrics::record_cache_lookup(type_tag::<T>(), true);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache payload undecodable, treating as miss");
                metrics::record_cache_lookup(type_tag::<T>(), false);
                None
            }
        }
    }

    /// Store a `T` under its derived key with `ttl` or the default.
    /// Failures are logged and swallowed.
    pub async fn set<T, I>(&self, id: &I, value: &T, ttl: Option<Duration>)
    where
        T: Serialize,
        I: Display + ?Sized,
    {
        let key = cache_key::<T, I>(id);
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache value unserializable, skipping write");
                return;
            }
        };
        let ttl = ttl.unwrap_or(self.default_ttl);

        let backend = self.backend.clone();
        let write = self
            .executor
            .execute_capped(DEFAULT_PIPELINE, self.call_deadline, || {
                let backend = backend.clone();
                let key = key.clone();
                let bytes = bytes.clone();
                async move {
                    backend
                        .set(&key, bytes, ttl)
                        .await
                        .map_err(|e| CallError::Transient(e.to_string()))
                }
            })
            .await;

        if let Err(e) = write {
            tracing::warn!(key = %key, error = %e, "Cache write failed, continuing without cache");
        }
    }

    /// Invalidate the entry for a `T` with the given id. Failures are logged
    /// and swallowed. Mutations on the authoritative source must call this
    /// for the affected key to avoid serving stale data.
    pub async fn remove<T, I>(&self, id: &I)
    where
        I: Display + ?Sized,
    {
        let key = cache_key::<T, I>(id);

        let backend = self.backend.clone();
        let delete = self
            .executor
            .execute_capped(DEFAULT_PIPELINE, self.call_deadline, || {
                let backend = backend.clone();
                let key = key.clone();
                async move {
                    backend
                        .remove(&key)
                        .await
                        .map_err(|e| CallError::Transient(e.to_string()))
                }
            })
            .await;

        if let Err(e) = delete {
            tracing::warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }

    /// Read-through cache-aside: return the cached value on a hit; on a
    /// miss, fetch from the authoritative source, populate the cache with
    /// the default TTL, and return the fresh value. Fetch errors propagate
    /// unchanged and nothing is cached.
    pub async fn get_or_fetch<T, I, E, F, Fut>(&self, id: &I, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        I: Display + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T, I>(id).await {
            return Ok(cached);
        }

        let fresh = fetch().await?;
        self.set(id, &fresh, None).await;
        Ok(fresh)
    }
}
