//! Response materialization
//!
//! Converts the untyped JSON returned by the transport into typed,
//! null-aware records:
//!
//! - [`keys`] - Rewrites vendor camelCase keys to snake_case, at every depth
//! - [`scalar`] - Scalar union and coercion from raw JSON values
//! - [`record`] - Allow-list filtering and recursive materialization

pub mod keys;
pub mod record;
pub mod scalar;

pub use keys::normalize_keys;
pub use record::{filter_to_shape, materialize, materialize_record, Field, Record};
pub use scalar::{value_kind, Scalar};

use crate::endpoint::Endpoint;
use crate::error::{AdapterError, Result};
use serde_json::Value;

/// Materialized response of one endpoint call
pub type TypedResponse = Record;

/// Normalize and materialize what the transport returned for `endpoint`.
///
/// A missing body, or a JSON `null` one, is only accepted for endpoints that
/// declare no response fields.
pub fn materialize_response(endpoint: &Endpoint, raw: Option<Value>) -> Result<TypedResponse> {
    let raw = match raw.filter(|raw| !raw.is_null()) {
        Some(raw) => normalize_keys(raw),
        None if endpoint.expects_body() => {
            return Err(AdapterError::NilResponse {
                endpoint: endpoint.key.clone(),
            })
        }
        None => return Ok(Record::null_of(&endpoint.response)),
    };

    materialize(&endpoint.response, &raw).map_err(|e| e.for_endpoint(&endpoint.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::get_endpoint;
    use serde_json::json;

    #[test]
    fn test_list_api_keys_vendor_casing() {
        let endpoint = get_endpoint("list-api-keys").unwrap();
        let raw = json!({
            "apiKeyPage": {
                "content": [
                    {"apiKeyId": "k1", "apiKeyName": "ci", "isEnabled": true, "someNewField": 1}
                ],
                "total": 1
            }
        });

        let response = materialize_response(&endpoint, Some(raw)).unwrap();
        let page = response.record("api_key_page").unwrap();
        assert_eq!(page.i64("total"), Some(1));

        let keys = page.items("content").unwrap();
        assert_eq!(keys[0].str("api_key_id"), Some("k1"));
        assert_eq!(keys[0].bool("is_enabled"), Some(true));
        assert!(keys[0].get("some_new_field").is_none());
    }

    #[test]
    fn test_nil_response_for_endpoint_with_body() {
        let endpoint = get_endpoint("get-product").unwrap();
        let err = materialize_response(&endpoint, None).unwrap_err();
        assert!(matches!(err, AdapterError::NilResponse { .. }));
    }

    #[test]
    fn test_null_body_is_nil_response() {
        let endpoint = get_endpoint("get-product").unwrap();
        let err = materialize_response(&endpoint, Some(Value::Null)).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::NilResponse { endpoint } if endpoint == "get-product"
        ));
    }

    #[test]
    fn test_delete_accepts_no_body() {
        let endpoint = get_endpoint("delete-product").unwrap();
        let response = materialize_response(&endpoint, None).unwrap();
        assert!(response.is_empty());

        let response = materialize_response(&endpoint, Some(Value::Null)).unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn test_type_mismatch_carries_endpoint_and_field() {
        let endpoint = get_endpoint("get-product").unwrap();
        let raw = json!({"product": {"productName": ["x"]}});
        let err = materialize_response(&endpoint, Some(raw)).unwrap_err();
        match err {
            AdapterError::TypeMismatch {
                endpoint, field, ..
            } => {
                assert_eq!(endpoint, "get-product");
                assert_eq!(field, "product.product_name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
