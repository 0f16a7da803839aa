//! The resilient executor: retry → circuit breaker → timeout around one
//! operation closure.
//!
//! # Responsibilities
//! - Look up the named pipeline and run the operation under its policy
//! - Sequential retries with backoff; attempt n+1 never starts before
//!   attempt n completes or times out
//! - Consult the breaker before every attempt and record every outcome
//! - Bound each attempt with the per-attempt timeout
//!
//! # Design Decisions
//! - Retries stop immediately once the circuit is Open
//! - A timed-out attempt is a failure sample; sustained slowness opens the
//!   circuit exactly like explicit errors
//! - Every inner failure is retryable and circuit-relevant; callers that
//!   need finer classification map non-retryable outcomes to success before
//!   returning from the closure

use crate::error::{CallError, CallResult};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::registry::PipelineRegistry;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};

/// Generic "run this operation under this pipeline" primitive.
#[derive(Clone)]
pub struct ResilientExecutor {
    registry: PipelineRegistry,
}

impl ResilientExecutor {
    pub fn new(registry: PipelineRegistry) -> Self {
        Self { registry }
    }

    /// The registry this executor consults.
    pub fn registry(&self) -> &PipelineRegistry {
        &self.registry
    }

    /// Execute `operation` under the pipeline registered at `pipeline_key`.
    ///
    /// `operation` is a single attempt; it may be invoked up to
    /// `max_retry_attempts + 1` times.
    pub async fn execute<T, F, Fut>(&self, pipeline_key: &str, operation: F) -> CallResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CallResult<T>>,
    {
        self.run(pipeline_key, None, operation).await
    }

    /// Like [`execute`](Self::execute), with each attempt's deadline clamped
    /// to `cap` when that is shorter than the pipeline's per-attempt timeout.
    ///
    /// Expiry of the clamped deadline is a recorded `Timeout` failure
    /// sample, so a caller with a tight budget still feeds the circuit.
    pub async fn execute_capped<T, F, Fut>(
        &self,
        pipeline_key: &str,
        cap: Duration,
        operation: F,
    ) -> CallResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CallResult<T>>,
    {
        self.run(pipeline_key, Some(cap), operation).await
    }

    async fn run<T, F, Fut>(
        &self,
        pipeline_key: &str,
        attempt_cap: Option<Duration>,
        mut operation: F,
    ) -> CallResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CallResult<T>>,
    {
        let pipeline = self.registry.get(pipeline_key)?;
        let policy = &pipeline.policy;
        let total_attempts = policy.max_retry_attempts + 1;
        let attempt_timeout = match attempt_cap {
            Some(cap) => policy.per_attempt_timeout.min(cap),
            None => policy.per_attempt_timeout,
        };

        let started = Instant::now();
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let permit = match pipeline.breaker.try_acquire() {
                Ok(permit) => permit,
                Err(open) => {
                    metrics::record_attempt(pipeline_key, "circuit_open");
                    return Err(open);
                }
            };

            let failure = match timeout(attempt_timeout, operation()).await {
                Ok(Ok(value)) => {
                    permit.record_success();
                    metrics::record_attempt(pipeline_key, "success");
                    metrics::record_call_duration(pipeline_key, started);
                    return Ok(value);
                }
                Ok(Err(e)) => e,
                Err(_) => CallError::Timeout {
                    limit: attempt_timeout,
                },
            };

            permit.record_failure();
            metrics::record_attempt(
                pipeline_key,
                if failure.is_timeout() { "timeout" } else { "failure" },
            );

            if !failure.is_retryable() || attempt >= total_attempts {
                metrics::record_call_duration(pipeline_key, started);
                return Err(failure);
            }

            let delay = calculate_backoff(
                attempt,
                policy.retry_base_delay,
                policy.backoff,
                policy.use_jitter,
            );
            tracing::warn!(
                pipeline = %pipeline_key,
                attempt,
                delay = ?delay,
                error = %failure,
                "Attempt failed, retrying"
            );
            sleep(delay).await;
        }
    }

    /// Like [`execute`](Self::execute), aborting the whole retry loop when
    /// `cancel` completes.
    pub async fn execute_with_signal<T, F, Fut, C>(
        &self,
        pipeline_key: &str,
        operation: F,
        cancel: C,
    ) -> CallResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CallResult<T>>,
        C: Future<Output = ()>,
    {
        tokio::select! {
            result = self.execute(pipeline_key, operation) => result,
            _ = cancel => {
                tracing::debug!(pipeline = %pipeline_key, "Call cancelled by caller");
                Err(CallError::Cancelled)
            }
        }
    }
}
