//! Request body serialization

use super::descriptor::{BodyKind, Endpoint};
use super::request::Request;
use crate::error::{AdapterError, Result};
use serde_json::{Map, Value};

/// Assemble the JSON body of a call.
///
/// Required fields must be present; optional fields are included only when
/// set. Values are copied verbatim under the field's wire key, except for
/// `json` fields whose pre-serialized string form is parsed and spliced in as
/// structured JSON. Endpoints without body fields produce `None`.
pub fn build_body(endpoint: &Endpoint, request: &Request) -> Result<Option<Value>> {
    if !endpoint.has_body() {
        return Ok(None);
    }

    let mut body = Map::new();
    for field in &endpoint.body_fields {
        let Some(value) = request.get(&field.name) else {
            if field.required {
                return Err(AdapterError::validation(
                    &endpoint.key,
                    &field.name,
                    "required body field is missing",
                ));
            }
            continue;
        };

        let value = match (field.kind, value) {
            (BodyKind::Json, Value::String(raw)) => {
                serde_json::from_str(raw).map_err(|source| AdapterError::Serialization {
                    endpoint: endpoint.key.clone(),
                    source,
                })?
            }
            _ => value.clone(),
        };
        body.insert(field.key.clone(), value);
    }

    Ok(Some(Value::Object(body)))
}

/// Encode a body as the text sent on the wire
pub fn encode_body(endpoint: &Endpoint, body: &Value) -> Result<String> {
    serde_json::to_string(body).map_err(|source| AdapterError::Serialization {
        endpoint: endpoint.key.clone(),
        source,
    })
}
