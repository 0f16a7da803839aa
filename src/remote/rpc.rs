//! RPC call client.
//!
//! Transport-agnostic request/response wrapper: the caller supplies the
//! dispatch closure (a generated stub call, typically), this module supplies
//! the resilience pipeline and the status/detail failure semantics. Any
//! non-OK status is a failure; a null/absent response where one is expected
//! is a failure.

use crate::error::{CallError, CallResult};
use crate::remote::{degrade_or_raise, CallOptions, UnauthorizedHook};
use crate::resilience::ResilientExecutor;
use std::future::Future;

/// Status/detail pair surfaced by an RPC transport.
#[derive(Debug, Clone)]
pub struct RpcStatus {
    /// gRPC-style status code; 0 is OK.
    pub code: u32,
    pub detail: String,
}

impl RpcStatus {
    pub const OK: u32 = 0;
    pub const UNAUTHENTICATED: u32 = 16;

    pub fn new(code: u32, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == Self::OK
    }
}

/// Resilient wrapper for request/response RPC calls.
#[derive(Clone)]
pub struct RpcClient {
    executor: ResilientExecutor,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl RpcClient {
    pub fn new(executor: ResilientExecutor) -> Self {
        Self {
            executor,
            on_unauthorized: None,
        }
    }

    /// Register the callback invoked on an UNAUTHENTICATED status.
    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    /// Execute `dispatch(request)` under the pipeline in `options`.
    ///
    /// `dispatch` performs one transport attempt and reports either the
    /// (possibly absent) response or the transport's status/detail pair.
    pub async fn call<TReq, TResp, F, Fut>(
        &self,
        options: CallOptions<'_>,
        request: &TReq,
        dispatch: F,
    ) -> CallResult<TResp>
    where
        TResp: Default,
        F: Fn(&TReq) -> Fut,
        Fut: Future<Output = Result<Option<TResp>, RpcStatus>>,
    {
        let operation = options.operation;
        tracing::debug!(operation = %operation, pipeline = %options.pipeline, "Dispatching RPC call");

        // Only Copy captures (shared references) so the closure stays FnMut
        // while each attempt's future owns its borrows outright.
        let dispatch = &dispatch;
        let hook = self.on_unauthorized.as_ref();
        let result = self
            .executor
            .execute(options.pipeline, move || async move {
                match dispatch(request).await {
                    Ok(Some(response)) => Ok(response),
                    Ok(None) => Err(CallError::Remote {
                        operation: operation.to_string(),
                        status: 0,
                        detail: "expected a response but none was returned".to_string(),
                    }),
                    Err(status) if status.code == RpcStatus::UNAUTHENTICATED => {
                        if let Some(hook) = hook {
                            hook(operation);
                        }
                        Err(CallError::Unauthorized {
                            operation: operation.to_string(),
                        })
                    }
                    Err(status) => Err(CallError::Remote {
                        operation: operation.to_string(),
                        status: status.code,
                        detail: status.detail,
                    }),
                }
            })
            .await;

        degrade_or_raise(&options, result)
    }
}
