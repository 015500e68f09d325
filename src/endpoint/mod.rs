//! Endpoint descriptors and request building
//!
//! This module provides a data-driven description of the gateway's REST
//! operations. Endpoint definitions are loaded from JSON files at compile
//! time, so supporting another operation is a catalog change, not a code
//! change.
//!
//! # Architecture
//!
//! - [`descriptor`] - Resolved endpoint, shape and parameter types
//! - [`registry`] - Loads and caches descriptors from embedded JSON
//! - [`request`] - Caller-supplied field values with explicit presence
//! - [`path`] - Path template rendering and query assembly
//! - [`body`] - JSON body assembly
//!
//! # Example
//!
//! ```ignore
//! use apigw_bridge::endpoint::{get_endpoint, prepare, Request};
//!
//! let endpoint = get_endpoint("create-api").unwrap();
//! let request = Request::new().set("product_id", "p1").set("api_name", "demo");
//! let call = prepare(&endpoint, &request)?;
//! assert_eq!(call.path, "/products/p1/apis");
//! ```

pub mod body;
pub mod descriptor;
pub mod path;
pub mod registry;
pub mod request;

pub use descriptor::{
    BodyField, BodyKind, Endpoint, FieldDef, FieldType, HttpMethod, Pagination, PathParam,
    QueryParam, ScalarKind, Shape,
};
pub use registry::{builtin, get_endpoint, CatalogBuilder, CatalogDocument, EndpointRegistry};
pub use request::Request;

use crate::error::Result;
use serde_json::Value;

/// A fully rendered call, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    pub method: HttpMethod,
    /// Path relative to the API base URL, already percent-encoded
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl PreparedCall {
    /// Body as sent on the wire
    pub fn body_text(&self, endpoint: &Endpoint) -> Result<Option<String>> {
        self.body
            .as_ref()
            .map(|body| body::encode_body(endpoint, body))
            .transpose()
    }
}

/// Build the path, query and body of a call
pub fn prepare(endpoint: &Endpoint, request: &Request) -> Result<PreparedCall> {
    let path = path::render_path(endpoint, request)?;
    let query = path::build_query(endpoint, request)?;
    let body = body::build_body(endpoint, request)?;

    Ok(PreparedCall {
        method: endpoint.method,
        path,
        query,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_create_api() {
        let endpoint = get_endpoint("create-api").unwrap();
        let request = Request::new()
            .set("product_id", "p1")
            .set("api_name", "demo");

        let call = prepare(&endpoint, &request).unwrap();
        assert_eq!(call.method, HttpMethod::Post);
        assert_eq!(call.path, "/products/p1/apis");
        assert!(call.query.is_empty());
        assert_eq!(
            call.body_text(&endpoint).unwrap().as_deref(),
            Some(r#"{"apiName":"demo"}"#)
        );
    }

    #[test]
    fn test_required_only_request_produces_exactly_required_keys() {
        for endpoint in builtin().iter() {
            let mut request = Request::new();
            for name in endpoint.required_fields() {
                request.insert(name, "x");
            }

            let call = prepare(endpoint, &request)
                .unwrap_or_else(|e| panic!("{} failed: {}", endpoint.key, e));

            let required_query: Vec<&str> = endpoint
                .query_params
                .iter()
                .filter(|q| q.required)
                .map(|q| q.key.as_str())
                .collect();
            let sent_query: Vec<&str> = call.query.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(sent_query, required_query, "{}", endpoint.key);

            if let Some(Value::Object(body)) = &call.body {
                let mut sent: Vec<&str> = body.keys().map(|k| k.as_str()).collect();
                let mut required: Vec<&str> = endpoint
                    .body_fields
                    .iter()
                    .filter(|b| b.required)
                    .map(|b| b.key.as_str())
                    .collect();
                sent.sort_unstable();
                required.sort_unstable();
                assert_eq!(sent, required, "{}", endpoint.key);
            }
        }
    }
}
