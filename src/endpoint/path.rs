//! Path and query building
//!
//! Renders an endpoint's path template from the request's identifier fields
//! and assembles the outgoing query parameters.

use super::descriptor::Endpoint;
use super::request::Request;
use crate::error::{AdapterError, Result};
use serde_json::Value;

/// Render a path parameter or query value as text
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Substitute every path parameter into the endpoint's path template.
///
/// Stray double quotes are stripped from each value before it is
/// percent-encoded, so `"p1"` and `p1` render the same segment.
pub fn render_path(endpoint: &Endpoint, request: &Request) -> Result<String> {
    let mut path = endpoint.path.clone();

    for param in &endpoint.path_params {
        let Some(value) = request.get(&param.name) else {
            return Err(AdapterError::validation(
                &endpoint.key,
                &param.name,
                "required path parameter is missing",
            ));
        };
        let Some(text) = value_to_text(value) else {
            return Err(AdapterError::validation(
                &endpoint.key,
                &param.name,
                format!(
                    "path parameter must be a scalar, got {}",
                    crate::materialize::value_kind(value)
                ),
            ));
        };
        let text = text.replace('"', "");
        if text.is_empty() {
            return Err(AdapterError::validation(
                &endpoint.key,
                &param.name,
                "path parameter must not be empty",
            ));
        }

        let placeholder = format!("{{{}}}", param.placeholder);
        path = path.replace(&placeholder, &urlencoding::encode(&text));
    }

    Ok(path)
}

/// Assemble the query parameters sent with a call.
///
/// Required parameters are always sent (an empty string included); optional
/// ones only when present. Arrays expand into repeated keys.
pub fn build_query(endpoint: &Endpoint, request: &Request) -> Result<Vec<(String, String)>> {
    let mut query = Vec::new();

    for param in &endpoint.query_params {
        let Some(value) = request.get(&param.name) else {
            if param.required {
                return Err(AdapterError::validation(
                    &endpoint.key,
                    &param.name,
                    "required query parameter is missing",
                ));
            }
            continue;
        };

        let invalid = || {
            AdapterError::validation(
                &endpoint.key,
                &param.name,
                "query parameter must be a scalar or a list of scalars",
            )
        };

        match value {
            Value::Array(items) => {
                for item in items {
                    let text = value_to_text(item).ok_or_else(invalid)?;
                    query.push((param.key.clone(), text));
                }
            }
            other => {
                let text = value_to_text(other).ok_or_else(invalid)?;
                query.push((param.key.clone(), text));
            }
        }
    }

    Ok(query)
}
