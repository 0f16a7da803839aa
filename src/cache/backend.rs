//! Key-value cache backend contract.
//!
//! The store talks to any backend exposing GET/SET/DEL semantics over byte
//! payloads: a Redis-style network cache in production, the in-process
//! backend in tests and single-node deployments.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failure surfaced by a cache backend.
#[derive(Debug, Error)]
#[error("cache backend error: {0}")]
pub struct BackendError(pub String);

/// GET/SET/DEL over byte payloads. Keys are UTF-8 strings of the form
/// `"{TypeName}_{Id}"`; values are JSON-serialized payloads.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BackendError>;

    /// Delete the entry under `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), BackendError>;
}
