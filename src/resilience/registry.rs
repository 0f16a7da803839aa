//! Pipeline registry: the single process-wide home of circuit state.
//!
//! # Design Decisions
//! - One registry per process, built once from validated config and shared
//!   via `Arc` by every executor user
//! - The breaker for a key is created exactly once; duplicating it per
//!   repository/service instance would yield independent, ineffective
//!   circuits
//! - Lookups by unknown key surface `UnknownPipeline` rather than silently
//!   borrowing defaults

use crate::config::schema::{PipelineConfig, ResilienceConfig, DEFAULT_PIPELINE};
use crate::error::CallError;
use crate::resilience::breaker::CircuitBreaker;
use crate::resilience::policy::PipelinePolicy;
use dashmap::DashMap;
use std::sync::Arc;

/// A named pipeline: immutable policy plus its shared circuit state.
#[derive(Debug)]
pub struct Pipeline {
    pub key: String,
    pub policy: PipelinePolicy,
    pub breaker: CircuitBreaker,
}

/// Process-wide map of pipeline key → shared pipeline.
#[derive(Clone, Default)]
pub struct PipelineRegistry {
    inner: Arc<DashMap<String, Arc<Pipeline>>>,
}

impl PipelineRegistry {
    /// Build the registry from validated configuration.
    ///
    /// A `"default"` pipeline is always present; if the config does not name
    /// one, the documented default parameters are used.
    pub fn from_config(config: &ResilienceConfig) -> Self {
        let registry = Self::default();
        for (key, pipeline_config) in &config.pipelines {
            registry.insert(key, pipeline_config);
        }
        if registry.get(DEFAULT_PIPELINE).is_err() {
            registry.insert(DEFAULT_PIPELINE, &PipelineConfig::default());
        }
        tracing::info!(pipelines = registry.inner.len(), "Pipeline registry built");
        registry
    }

    fn insert(&self, key: &str, config: &PipelineConfig) {
        let policy = PipelinePolicy::from(config);
        let pipeline = Pipeline {
            key: key.to_string(),
            policy: policy.clone(),
            breaker: CircuitBreaker::new(key, policy),
        };
        self.inner.insert(key.to_string(), Arc::new(pipeline));
    }

    /// Look up the pipeline registered under `key`.
    pub fn get(&self, key: &str) -> Result<Arc<Pipeline>, CallError> {
        self.inner
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CallError::UnknownPipeline(key.to_string()))
    }

    /// Registered pipeline keys.
    pub fn keys(&self) -> Vec<String> {
        self.inner.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_injected() {
        let registry = PipelineRegistry::from_config(&ResilienceConfig::default());
        let pipeline = registry.get(DEFAULT_PIPELINE).unwrap();
        assert_eq!(pipeline.policy.max_retry_attempts, 2);
    }

    #[test]
    fn test_unknown_key_fails_loudly() {
        let registry = PipelineRegistry::from_config(&ResilienceConfig::default());
        let err = registry.get("no-such-pipeline").unwrap_err();
        assert!(matches!(err, CallError::UnknownPipeline(_)));
    }

    #[test]
    fn test_same_key_shares_circuit_state() {
        let registry = PipelineRegistry::from_config(&ResilienceConfig::default());
        let cloned = registry.clone();

        let a = registry.get(DEFAULT_PIPELINE).unwrap();
        let b = cloned.get(DEFAULT_PIPELINE).unwrap();
        assert!(Arc::ptr_eq(&a, &b), "breaker must be process-wide, not per caller");
    }
}
