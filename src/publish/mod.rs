//! Fire-and-forget event publishing.
//!
//! # Data Flow
//! ```text
//! Application publish:
//!     → serialize message (JSON)
//!     → resilience executor on the default pipeline
//!     → MessageSink (broker client)
//!     → failure? log with payload, count the drop, return normally
//! ```
//!
//! # Design Decisions
//! - `publish` never interrupts the caller's control flow; delivery is
//!   at-most-once and message loss under sustained broker outage is an
//!   accepted trade-off
//! - The sink is a dyn trait so broker clients plug in without the
//!   publisher knowing the transport

use crate::config::schema::DEFAULT_PIPELINE;
use crate::error::CallError;
use crate::observability::metrics;
use crate::resilience::ResilientExecutor;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Failure surfaced by a broker client.
#[derive(Debug, Error)]
#[error("message sink error: {0}")]
pub struct SinkError(pub String);

/// Publish-only broker interface. No acknowledgment is awaited beyond what
/// the broker client itself provides synchronously.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, payload: &[u8]) -> Result<(), SinkError>;
}

/// Publisher that wraps sink sends in the resilience pipeline and swallows
/// every failure after logging it.
#[derive(Clone)]
pub struct FireAndForgetPublisher {
    executor: ResilientExecutor,
    sink: Arc<dyn MessageSink>,
}

impl FireAndForgetPublisher {
    pub fn new(executor: ResilientExecutor, sink: Arc<dyn MessageSink>) -> Self {
        Self { executor, sink }
    }

    /// Publish `message`, never surfacing an error to the caller.
    pub async fn publish<M: Serialize>(&self, message: &M) {
        let payload = match serde_json::to_vec(message) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Message unserializable, dropping publish");
                metrics::record_publish_drop();
                return;
            }
        };

        let sink = self.sink.clone();
        let result = self
            .executor
            .execute(DEFAULT_PIPELINE, || {
                let sink = sink.clone();
                let payload = payload.clone();
                async move {
                    sink.send(&payload)
                        .await
                        .map_err(|e| CallError::Transient(e.to_string()))
                }
            })
            .await;

        if let Err(e) = result {
            tracing::error!(
                error = %e,
                payload = %String::from_utf8_lossy(&payload),
                "Publish failed, dropping message"
            );
            metrics::record_publish_drop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{PipelineConfig, ResilienceConfig};
    use crate::resilience::PipelineRegistry;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FailingSink;

    #[async_trait]
    impl MessageSink for FailingSink {
        async fn send(&self, _payload: &[u8]) -> Result<(), SinkError> {
            Err(SinkError("broker unreachable".into()))
        }
    }

    struct CountingSink {
        sent: AtomicU32,
    }

    #[async_trait]
    impl MessageSink for CountingSink {
        async fn send(&self, _payload: &[u8]) -> Result<(), SinkError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Serialize)]
    struct ProductInfo {
        id: u64,
        name: String,
    }

    fn test_executor() -> ResilientExecutor {
        let mut pipeline = PipelineConfig::default();
        pipeline.retry.max_attempts = 1;
        pipeline.retry.base_delay_ms = 1;
        pipeline.retry.jitter = false;
        pipeline.circuit_breaker.minimum_throughput = 2;

        let mut config = ResilienceConfig::default();
        config.pipelines.insert("default".into(), pipeline);
        ResilientExecutor::new(PipelineRegistry::from_config(&config))
    }

    #[tokio::test]
    async fn test_successful_publish_reaches_sink() {
        let sink = Arc::new(CountingSink {
            sent: AtomicU32::new(0),
        });
        let publisher = FireAndForgetPublisher::new(test_executor(), sink.clone());

        publisher
            .publish(&ProductInfo {
                id: 1,
                name: "anvil".into(),
            })
            .await;
        assert_eq!(sink.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_publish_never_interrupts_caller() {
        let publisher = FireAndForgetPublisher::new(test_executor(), Arc::new(FailingSink));

        // Broker throws on every call, including after the circuit opens;
        // the caller's subsequent code still executes.
        for id in 0..5 {
            publisher
                .publish(&ProductInfo {
                    id,
                    name: "anvil".into(),
                })
                .await;
        }
    }
}
