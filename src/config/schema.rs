//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! execution layer. All types derive Serde traits for deserialization from
//! config files, and every field has a default so a minimal (or empty)
//! config resolves to the documented production values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of the pipeline used when callers do not name one.
pub const DEFAULT_PIPELINE: &str = "default";

/// Root configuration for the resilient execution layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Named resilience pipelines. Empty maps get a `"default"` entry
    /// injected at registry construction.
    pub pipelines: HashMap<String, PipelineConfig>,

    /// Cache-aside settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One named pipeline: retry, circuit breaker and timeout parameters.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub timeout: TimeoutConfig,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first failure (total = max_attempts + 1).
    pub max_attempts: u32,

    /// Base delay before a retry in milliseconds.
    pub base_delay_ms: u64,

    /// Backoff shape applied to the base delay.
    pub backoff: BackoffKind,

    /// Randomize each delay within [0, computed] to avoid retry storms.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_ms: 2000,
            backoff: BackoffKind::Exponential,
            jitter: true,
        }
    }
}

/// Backoff shape for retry delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same delay before every retry.
    Constant,
    /// Delay doubles with each retry.
    #[default]
    Exponential,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failure ratio within the sampling window that opens the circuit.
    pub failure_ratio: f64,

    /// Length of the sliding outcome window in seconds.
    pub sampling_window_secs: u64,

    /// Minimum samples in the window before the ratio is evaluated.
    pub minimum_throughput: u32,

    /// How long the circuit stays open before admitting a probe, in seconds.
    pub break_duration_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_ratio: 0.5,
            sampling_window_secs: 10,
            minimum_throughput: 8,
            break_duration_secs: 30,
        }
    }
}

/// Per-attempt timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a single attempt in milliseconds.
    pub per_attempt_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            per_attempt_ms: 5000,
        }
    }
}

/// Cache-aside settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Default entry TTL in seconds when the caller supplies none.
    pub default_ttl_secs: u64,

    /// Outer deadline for a single cache call in milliseconds. The cache is
    /// an optimization; it never gets the full pipeline timeout.
    pub call_deadline_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 300, // 5 minutes
            call_deadline_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 2);
        assert_eq!(retry.base_delay_ms, 2000);
        assert_eq!(retry.backoff, BackoffKind::Exponential);
        assert!(retry.jitter);

        let cb = CircuitBreakerConfig::default();
        assert_eq!(cb.failure_ratio, 0.5);
        assert_eq!(cb.sampling_window_secs, 10);
        assert_eq!(cb.minimum_throughput, 8);
        assert_eq!(cb.break_duration_secs, 30);

        assert_eq!(TimeoutConfig::default().per_attempt_ms, 5000);
        assert_eq!(CacheConfig::default().default_ttl_secs, 300);
    }

    #[test]
    fn test_minimal_toml_resolves_defaults() {
        let config: ResilienceConfig = toml::from_str("").unwrap();
        assert!(config.pipelines.is_empty());
        assert_eq!(config.cache.call_deadline_ms, 1000);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_named_pipeline_overrides() {
        let config: ResilienceConfig = toml::from_str(
            r#"
            [pipelines.default.retry]
            max_attempts = 5
            backoff = "constant"

            [pipelines.default.circuit_breaker]
            minimum_throughput = 2
            "#,
        )
        .unwrap();

        let pipeline = &config.pipelines["default"];
        assert_eq!(pipeline.retry.max_attempts, 5);
        assert_eq!(pipeline.retry.backoff, BackoffKind::Constant);
        assert_eq!(pipeline.circuit_breaker.minimum_throughput, 2);
        // Untouched sections keep their defaults.
        assert_eq!(pipeline.timeout.per_attempt_ms, 5000);
    }
}
