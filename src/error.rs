//! Failure taxonomy for resilient calls.
//!
//! Every outcome a caller can observe is a tagged variant here, so call
//! sites match on the failure kind instead of parsing messages or walking
//! exception chains.

use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the execution layer.
pub type CallResult<T> = Result<T, CallError>;

/// A failed resilient call.
#[derive(Debug, Error)]
pub enum CallError {
    /// The pipeline's circuit is open; the inner operation was not invoked.
    #[error("circuit open for pipeline '{pipeline}'")]
    CircuitOpen { pipeline: String },

    /// One attempt exceeded the per-attempt deadline.
    #[error("attempt exceeded the {limit:?} deadline")]
    Timeout { limit: Duration },

    /// Transport-level or otherwise transient failure worth retrying.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The remote dependency answered with a non-success status. Wide enough
    /// for both HTTP status codes and u32 RPC transport codes.
    #[error("remote call '{operation}' failed with status {status}: {detail}")]
    Remote {
        operation: String,
        status: u32,
        detail: String,
    },

    /// The remote dependency rejected the caller's credentials.
    #[error("remote call '{operation}' was unauthorized")]
    Unauthorized { operation: String },

    /// A payload could not be encoded or decoded.
    #[error("serialization failure: {0}")]
    Serialization(String),

    /// No pipeline is registered under the requested key.
    #[error("unknown pipeline '{0}'")]
    UnknownPipeline(String),

    /// The caller abandoned the call before it settled.
    #[error("call cancelled by caller")]
    Cancelled,
}

impl CallError {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CallError::CircuitOpen { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CallError::Timeout { .. })
    }

    /// Whether the retry loop may attempt the operation again.
    ///
    /// An open circuit means retrying is pointless until the break elapses;
    /// an unknown pipeline is a configuration bug; a cancelled call must not
    /// be resurrected. Everything else is assumed transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            CallError::CircuitOpen { .. }
                | CallError::UnknownPipeline(_)
                | CallError::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CallError::Transient("reset".into()).is_retryable());
        assert!(CallError::Timeout {
            limit: Duration::from_secs(5)
        }
        .is_retryable());
        assert!(CallError::Remote {
            operation: "GetFreightInfo".into(),
            status: 500,
            detail: "boom".into()
        }
        .is_retryable());

        assert!(!CallError::CircuitOpen {
            pipeline: "default".into()
        }
        .is_retryable());
        assert!(!CallError::UnknownPipeline("nope".into()).is_retryable());
        assert!(!CallError::Cancelled.is_retryable());
    }

    #[test]
    fn test_display_carries_operation_context() {
        let err = CallError::Remote {
            operation: "PlaceOrder".into(),
            status: 503,
            detail: "queue full".into(),
        };
        let text = err.to_string();
        assert!(text.contains("PlaceOrder"));
        assert!(text.contains("503"));
    }
}
