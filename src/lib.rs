//! Resilient remote-call execution layer.
//!
//! Every call to an unreliable external dependency (cache store, REST
//! partner, RPC peer, message broker) runs through one primitive: a named
//! pipeline composing retry, circuit breaking and per-attempt timeouts.
//!
//! # Architecture Overview
//!
//! ```text
//!  application services (out of scope)
//!        │             │              │
//!        ▼             ▼              ▼
//!  ┌──────────┐  ┌───────────┐  ┌───────────┐
//!  │  cache   │  │  remote   │  │  publish  │
//!  │  store   │  │ REST/RPC  │  │ fire&forget│
//!  └────┬─────┘  └─────┬─────┘  └─────┬─────┘
//!       │              │              │
//!       └──────────────┼──────────────┘
//!                      ▼
//!            ┌───────────────────┐
//!            │ resilience        │
//!            │ executor + registry│
//!            │ retry → breaker → │
//!            │ timeout           │
//!            └─────────┬─────────┘
//!                      ▼
//!              external dependency
//! ```
//!
//! Pipelines are configured once at startup ([`config`]), resolved into a
//! process-wide [`resilience::PipelineRegistry`] so all callers share one
//! circuit per key, and consulted on every call.

// Core subsystem
pub mod resilience;

// Dependency wrappers
pub mod cache;
pub mod publish;
pub mod remote;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use cache::{CacheStore, MemoryBackend};
pub use config::{ResilienceConfig, DEFAULT_PIPELINE};
pub use error::{CallError, CallResult};
pub use publish::FireAndForgetPublisher;
pub use remote::{CallOptions, RestClient, RpcClient};
pub use resilience::{PipelineRegistry, ResilientExecutor};
