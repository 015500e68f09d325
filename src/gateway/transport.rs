//! Transport seam
//!
//! The engine only needs one operation from the network: send a method, URL,
//! optional JSON body and query, and get back the decoded JSON object (or
//! nothing). [`HttpTransport`](super::http::HttpTransport) implements it with
//! reqwest; tests plug in their own.

use crate::endpoint::HttpMethod;
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Per-call context threaded through to the transport
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Sent as `X-Request-Id` and included in log lines
    pub request_id: Uuid,
    /// Deadline for the HTTP exchange; only the transport enforces it
    pub timeout: Option<Duration>,
}

impl CallContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Context for a sub-call: same deadline, fresh request id
    pub fn child(&self) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: self.timeout,
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange.
    ///
    /// Returns `Ok(None)` when the gateway answered with no body. A success
    /// body that is not a JSON object is an error.
    async fn call(
        &self,
        ctx: &CallContext,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<Option<Value>, TransportError>;
}
