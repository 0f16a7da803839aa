//! Remote call subsystem.
//!
//! # Data Flow
//! ```text
//! Application call:
//!     → rest.rs / rpc.rs build one attempt closure
//!     → resilience executor (retry / breaker / timeout)
//!     → transport (reqwest HTTP, or a caller-supplied RPC dispatch)
//!     → unauthorized? invoke the registered hook
//!     → throw_on_failure? surface the error : degrade to default + log
//! ```
//!
//! # Design Decisions
//! - The unauthorized hook is an explicit constructor dependency (e.g. to
//!   trigger credential refresh), not an implicit event side channel
//! - Failures are retried whether or not the caller opted into raising
//!   them; `throw_on_failure` only changes what the caller sees
//! - Degraded calls return `Default::default()` so optional integrations
//!   keep flowing when a partner is down

pub mod rest;
pub mod rpc;

use crate::config::schema::DEFAULT_PIPELINE;
use crate::error::CallResult;
use std::sync::Arc;

/// Callback invoked with the operation name on a transport-level
/// unauthorized signal, before the outcome is surfaced.
pub type UnauthorizedHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Per-invocation context for a remote call.
#[derive(Debug, Clone)]
pub struct CallOptions<'a> {
    /// Pipeline key governing retry/breaker/timeout behavior.
    pub pipeline: &'a str,
    /// Operation name for logging and error annotation.
    pub operation: &'a str,
    /// Raise failures to the caller instead of degrading to a default
    /// response.
    pub throw_on_failure: bool,
}

impl<'a> CallOptions<'a> {
    pub fn new(operation: &'a str) -> Self {
        Self {
            pipeline: DEFAULT_PIPELINE,
            operation,
            throw_on_failure: false,
        }
    }

    pub fn pipeline(mut self, pipeline: &'a str) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn throw_on_failure(mut self, throw: bool) -> Self {
        self.throw_on_failure = throw;
        self
    }
}

/// Apply the propagation policy: raise when requested, otherwise log the
/// failure and fall back to the default response.
pub(crate) fn degrade_or_raise<T: Default>(
    options: &CallOptions<'_>,
    result: CallResult<T>,
) -> CallResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if options.throw_on_failure => Err(e),
        Err(e) => {
            tracing::error!(
                operation = %options.operation,
                pipeline = %options.pipeline,
                error = %e,
                "Remote call failed, degrading to default response"
            );
            Ok(T::default())
        }
    }
}

pub use rest::RestClient;
pub use rpc::{RpcClient, RpcStatus};
