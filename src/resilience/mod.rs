//! Resilience subsystem: the core execution primitive.
//!
//! # Data Flow
//! ```text
//! Call through cache / remote client / publisher:
//!     → registry.rs (pipeline key → policy + shared circuit state)
//!     → executor.rs (retry loop)
//!         → breaker.rs (pass / fast-fail / single probe)
//!         → per-attempt timeout around the raw operation
//!         → backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Composition order is retry → circuit breaker → timeout, so every retry
//!   attempt sees the current circuit state and its own deadline
//! - Circuit state lives in the registry, one instance per pipeline key for
//!   the whole process
//! - All resilience parameters come from immutable policies resolved at
//!   startup

pub mod backoff;
pub mod breaker;
pub mod executor;
pub mod policy;
pub mod registry;

pub use breaker::{AttemptPermit, CircuitBreaker, CircuitPhase};
pub use executor::ResilientExecutor;
pub use policy::PipelinePolicy;
pub use registry::{Pipeline, PipelineRegistry};
