//! Gateway Client
//!
//! Main client for invoking gateway endpoints, combining the endpoint
//! registry, request building, the transport and response materialization.

use super::transport::{CallContext, Transport};
use crate::endpoint::{
    builtin, prepare as prepare_call, Endpoint, EndpointRegistry, PreparedCall, Request,
};
use crate::error::{AdapterError, Result};
use crate::materialize::{materialize_response, TypedResponse};
use crate::native::{to_native, AttrValue};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Main gateway client
#[derive(Clone)]
pub struct GatewayClient {
    transport: Arc<dyn Transport>,
    registry: Arc<EndpointRegistry>,
    base_url: String,
}

impl GatewayClient {
    /// Create a new client over the builtin endpoint catalog
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| AdapterError::Config(format!("invalid base URL `{}`: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(AdapterError::Config(format!(
                "base URL `{}` cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            transport,
            registry: builtin(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Use a different endpoint catalog
    pub fn with_registry(mut self, registry: Arc<EndpointRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up an endpoint by key
    pub fn endpoint(&self, key: &str) -> Result<Arc<Endpoint>> {
        self.registry.endpoint(key).cloned()
    }

    /// Build a full API URL from a rendered path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build the call without sending it
    pub fn prepare(&self, endpoint: &Endpoint, request: &Request) -> Result<PreparedCall> {
        prepare_call(endpoint, request)
    }

    /// Send one call and return the raw body as the gateway sent it
    pub async fn call_raw(
        &self,
        ctx: &CallContext,
        endpoint: &Endpoint,
        request: &Request,
    ) -> Result<Option<Value>> {
        let call = self.prepare(endpoint, request)?;
        let url = self.url_for(&call.path);

        tracing::debug!(
            "Calling {} ({} {}) [request_id={}]",
            endpoint.key,
            call.method,
            call.path,
            ctx.request_id
        );

        self.transport
            .call(ctx, call.method, &url, call.body.as_ref(), &call.query)
            .await
            .map_err(|source| {
                tracing::warn!("{} failed: {} [request_id={}]", endpoint.key, source, ctx.request_id);
                AdapterError::Transport {
                    endpoint: endpoint.key.clone(),
                    source,
                }
            })
    }

    /// Invoke an endpoint and materialize its typed response
    pub async fn execute(
        &self,
        ctx: &CallContext,
        endpoint: &Endpoint,
        request: &Request,
    ) -> Result<TypedResponse> {
        let raw = self.call_raw(ctx, endpoint, request).await?;
        let response = materialize_response(endpoint, raw)?;
        tracing::debug!(
            "{} returned {} fields ({} null)",
            endpoint.key,
            response.len(),
            response.null_fields().len()
        );
        Ok(response)
    }

    /// Invoke an endpoint by key
    pub async fn execute_key(
        &self,
        ctx: &CallContext,
        key: &str,
        request: &Request,
    ) -> Result<TypedResponse> {
        let endpoint = self.endpoint(key)?;
        self.execute(ctx, &endpoint, request).await
    }

    /// Invoke an endpoint and return the control plane's attribute form
    pub async fn execute_native(
        &self,
        ctx: &CallContext,
        endpoint: &Endpoint,
        request: &Request,
    ) -> Result<AttrValue> {
        let response = self.execute(ctx, endpoint, request).await?;
        Ok(to_native(&response))
    }

    /// Invoke several calls concurrently, each with its own request id.
    ///
    /// Results come back in input order; one failure does not cancel the rest.
    pub async fn execute_many(
        &self,
        ctx: &CallContext,
        calls: &[(Arc<Endpoint>, Request)],
    ) -> Vec<Result<TypedResponse>> {
        let futures = calls.iter().map(|(endpoint, request)| {
            let ctx = ctx.child();
            async move { self.execute(&ctx, endpoint, request).await }
        });
        join_all(futures).await
    }
}
