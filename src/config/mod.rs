//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ResilienceConfig (validated, immutable)
//!     → PipelineRegistry built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; pipelines are created at process start
//!   and looked up by key for every call
//! - All fields have defaults so a minimal config resolves to the documented
//!   production values
//! - Validation separates syntactic (serde) from semantic checks and reports
//!   every violation at once

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    BackoffKind, CacheConfig, CircuitBreakerConfig, ObservabilityConfig, PipelineConfig,
    ResilienceConfig, RetryConfig, TimeoutConfig, DEFAULT_PIPELINE,
};
