//! Immutable pipeline policy.
//!
//! A `PipelinePolicy` is the resolved form of one `[pipelines.<key>]` config
//! entry: durations instead of raw integers, created once at registry
//! construction and never mutated afterwards.

use crate::config::schema::{BackoffKind, PipelineConfig};
use std::time::Duration;

/// Resolved retry, circuit-breaker and timeout parameters for one pipeline.
#[derive(Debug, Clone)]
pub struct PipelinePolicy {
    /// Additional attempts after the first failure.
    pub max_retry_attempts: u32,
    /// Base delay before a retry.
    pub retry_base_delay: Duration,
    /// Backoff shape applied to the base delay.
    pub backoff: BackoffKind,
    /// Randomize each delay within [0, computed].
    pub use_jitter: bool,

    /// Failure ratio within the sampling window that opens the circuit.
    pub failure_ratio: f64,
    /// Length of the sliding outcome window.
    pub sampling_window: Duration,
    /// Minimum samples before the ratio is evaluated.
    pub minimum_throughput: u32,
    /// How long the circuit stays open before admitting a probe.
    pub break_duration: Duration,

    /// Deadline for a single attempt.
    pub per_attempt_timeout: Duration,
}

impl From<&PipelineConfig> for PipelinePolicy {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_retry_attempts: config.retry.max_attempts,
            retry_base_delay: Duration::from_millis(config.retry.base_delay_ms),
            backoff: config.retry.backoff,
            use_jitter: config.retry.jitter,
            failure_ratio: config.circuit_breaker.failure_ratio,
            sampling_window: Duration::from_secs(config.circuit_breaker.sampling_window_secs),
            minimum_throughput: config.circuit_breaker.minimum_throughput,
            break_duration: Duration::from_secs(config.circuit_breaker.break_duration_secs),
            per_attempt_timeout: Duration::from_millis(config.timeout.per_attempt_ms),
        }
    }
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}
