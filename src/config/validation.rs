//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones: value ranges, durations
//! that must be positive, and pipeline sanity. Returns all violations, not
//! just the first, so a bad config file is fixed in one pass.

use crate::config::schema::{PipelineConfig, ResilienceConfig};

/// A single semantic violation in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `pipelines.default.retry`.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ResilienceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (key, pipeline) in &config.pipelines {
        validate_pipeline(key, pipeline, &mut errors);
    }

    if config.cache.call_deadline_ms == 0 {
        errors.push(ValidationError {
            field: "cache.call_deadline_ms".into(),
            message: "must be greater than zero".into(),
        });
    }
    if config.cache.default_ttl_secs == 0 {
        errors.push(ValidationError {
            field: "cache.default_ttl_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_pipeline(key: &str, pipeline: &PipelineConfig, errors: &mut Vec<ValidationError>) {
    let cb = &pipeline.circuit_breaker;
    if !(cb.failure_ratio > 0.0 && cb.failure_ratio <= 1.0) {
        errors.push(ValidationError {
            field: format!("pipelines.{key}.circuit_breaker.failure_ratio"),
            message: format!("must be in (0, 1], got {}", cb.failure_ratio),
        });
    }
    if cb.minimum_throughput == 0 {
        errors.push(ValidationError {
            field: format!("pipelines.{key}.circuit_breaker.minimum_throughput"),
            message: "must be at least 1".into(),
        });
    }
    if cb.sampling_window_secs == 0 {
        errors.push(ValidationError {
            field: format!("pipelines.{key}.circuit_breaker.sampling_window_secs"),
            message: "must be greater than zero".into(),
        });
    }
    if cb.break_duration_secs == 0 {
        errors.push(ValidationError {
            field: format!("pipelines.{key}.circuit_breaker.break_duration_secs"),
            message: "must be greater than zero".into(),
        });
    }

    if pipeline.retry.max_attempts > 0 && pipeline.retry.base_delay_ms == 0 {
        errors.push(ValidationError {
            field: format!("pipelines.{key}.retry.base_delay_ms"),
            message: "must be greater than zero when retries are enabled".into(),
        });
    }

    if pipeline.timeout.per_attempt_ms == 0 {
        errors.push(ValidationError {
            field: format!("pipelines.{key}.timeout.per_attempt_ms"),
            message: "must be greater than zero".into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PipelineConfig;

    #[test]
    fn test_default_config_is_valid() {
        let mut config = ResilienceConfig::default();
        config
            .pipelines
            .insert("default".into(), PipelineConfig::default());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_all_violations_collected() {
        let mut config = ResilienceConfig::default();
        let mut pipeline = PipelineConfig::default();
        pipeline.circuit_breaker.failure_ratio = 1.5;
        pipeline.circuit_breaker.minimum_throughput = 0;
        pipeline.timeout.per_attempt_ms = 0;
        config.pipelines.insert("default".into(), pipeline);
        config.cache.call_deadline_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors
            .iter()
            .any(|e| e.field == "pipelines.default.circuit_breaker.failure_ratio"));
        assert!(errors.iter().any(|e| e.field == "cache.call_deadline_ms"));
    }

    #[test]
    fn test_zero_retries_allows_zero_delay() {
        let mut config = ResilienceConfig::default();
        let mut pipeline = PipelineConfig::default();
        pipeline.retry.max_attempts = 0;
        pipeline.retry.base_delay_ms = 0;
        config.pipelines.insert("no-retry".into(), pipeline);
        assert!(validate_config(&config).is_ok());
    }
}
