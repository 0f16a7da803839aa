//! REST call client.
//!
//! # Responsibilities
//! - Send request/response HTTP calls to a partner service under a named
//!   resilience pipeline
//! - Treat any non-2xx status or transport error as a failure, annotated
//!   with operation name, status and response body
//! - Invoke the unauthorized hook on HTTP 401 before surfacing the outcome

use crate::error::{CallError, CallResult};
use crate::remote::{degrade_or_raise, CallOptions, UnauthorizedHook};
use crate::resilience::ResilientExecutor;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Resilient HTTP client for one partner service.
#[derive(Clone)]
pub struct RestClient {
    executor: ResilientExecutor,
    http: reqwest::Client,
    base_url: Url,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl RestClient {
    /// Create a client for the service rooted at `base_url`.
    pub fn new(executor: ResilientExecutor, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            executor,
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            on_unauthorized: None,
        })
    }

    /// Register the callback invoked on an HTTP 401 response.
    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    /// Execute one request/response call under the pipeline in `options`.
    pub async fn execute<TReq, TResp>(
        &self,
        options: CallOptions<'_>,
        method: Method,
        path: &str,
        body: Option<&TReq>,
    ) -> CallResult<TResp>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned + Default,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| CallError::Transient(format!("invalid path '{path}': {e}")))?;

        let operation = options.operation;
        let result = self
            .executor
            .execute(options.pipeline, || {
                self.attempt(operation, method.clone(), url.clone(), body)
            })
            .await;

        degrade_or_raise(&options, result)
    }

    /// GET a JSON resource.
    pub async fn get_json<TResp>(&self, options: CallOptions<'_>, path: &str) -> CallResult<TResp>
    where
        TResp: DeserializeOwned + Default,
    {
        self.execute::<(), TResp>(options, Method::GET, path, None)
            .await
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<TReq, TResp>(
        &self,
        options: CallOptions<'_>,
        path: &str,
        body: &TReq,
    ) -> CallResult<TResp>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned + Default,
    {
        self.execute(options, Method::POST, path, Some(body)).await
    }

    /// One attempt: send, classify, decode.
    async fn attempt<TReq, TResp>(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<&TReq>,
    ) -> CallResult<TResp>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            CallError::Transient(format!("transport error on '{operation}': {e}"))
        })?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Some(hook) = &self.on_unauthorized {
                hook(operation);
            }
            return Err(CallError::Unauthorized {
                operation: operation.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| {
            CallError::Transient(format!("failed reading response of '{operation}': {e}"))
        })?;

        if !status.is_success() {
            return Err(CallError::Remote {
                operation: operation.to_string(),
                status: u32::from(status.as_u16()),
                detail: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            CallError::Serialization(format!(
                "undecodable response of '{operation}': {e} (body: {text})"
            ))
        })
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_unauthorized_hook", &self.on_unauthorized.is_some())
            .finish()
    }
}
