//! Error types
//!
//! Every failure carries the endpoint key it happened on, and field-level
//! failures carry the dotted field path (`content[1].api_name`).

use thiserror::Error;

/// Result alias used across the library
pub type Result<T, E = AdapterError> = std::result::Result<T, E>;

/// Errors raised while building, sending or materializing an endpoint call
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A required path, query or body field is missing or unusable
    #[error("{endpoint}: invalid field `{field}`: {reason}")]
    Validation {
        endpoint: String,
        field: String,
        reason: String,
    },

    /// The request body could not be encoded
    #[error("{endpoint}: failed to serialize request body: {source}")]
    Serialization {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Propagated verbatim from the transport
    #[error("{endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    /// The transport succeeded but returned no body for an endpoint that expects one
    #[error("{endpoint}: transport returned no response body")]
    NilResponse { endpoint: String },

    /// A declared field holds a value of the wrong dynamic kind
    #[error("{endpoint}: field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        endpoint: String,
        field: String,
        expected: String,
        found: String,
    },

    /// Scalar coercion met a value with no scalar mapping
    #[error("{endpoint}: field `{field}` has unsupported type {found}")]
    UnsupportedType {
        endpoint: String,
        field: String,
        found: String,
    },

    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The endpoint catalog is malformed
    #[error("invalid endpoint catalog: {0}")]
    Catalog(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl AdapterError {
    pub fn validation(endpoint: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            endpoint: endpoint.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the endpoint the error belongs to, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Validation { endpoint, .. }
            | Self::Serialization { endpoint, .. }
            | Self::Transport { endpoint, .. }
            | Self::NilResponse { endpoint }
            | Self::TypeMismatch { endpoint, .. }
            | Self::UnsupportedType { endpoint, .. } => Some(endpoint),
            Self::UnknownEndpoint(_) | Self::Catalog(_) | Self::Config(_) => None,
        }
    }

    /// HTTP status reported by the gateway, when the failure came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport {
                source: TransportError::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by a [`Transport`](crate::gateway::Transport) implementation
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("API request failed: {status}")]
    Status { status: u16, body: String },

    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// A success body that is neither empty nor a JSON object
    #[error("unexpected response body: expected a JSON object, got {0}")]
    UnexpectedBody(&'static str),

    #[error("failed to sign request: {0}")]
    Signer(String),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Materialization failure before the endpoint name is attached
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{field}` has unsupported type {found}")]
    UnsupportedType { field: String, found: &'static str },
}

impl FieldError {
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch { field, .. } | Self::UnsupportedType { field, .. } => field,
        }
    }

    /// Prefix the field path with its parent, e.g. `api_name` -> `content[1].api_name`
    pub(crate) fn within(self, parent: &str) -> Self {
        let join = |field: String| {
            if field.starts_with('[') {
                format!("{}{}", parent, field)
            } else {
                format!("{}.{}", parent, field)
            }
        };
        match self {
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => Self::TypeMismatch {
                field: join(field),
                expected,
                found,
            },
            Self::UnsupportedType { field, found } => Self::UnsupportedType {
                field: join(field),
                found,
            },
        }
    }

    /// Attach the endpoint key
    pub fn for_endpoint(self, endpoint: &str) -> AdapterError {
        match self {
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => AdapterError::TypeMismatch {
                endpoint: endpoint.to_string(),
                field,
                expected: expected.to_string(),
                found: found.to_string(),
            },
            Self::UnsupportedType { field, found } => AdapterError::UnsupportedType {
                endpoint: endpoint.to_string(),
                field,
                found: found.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_path_nesting() {
        let err = FieldError::TypeMismatch {
            field: "api_name".to_string(),
            expected: "string",
            found: "array",
        };
        let err = err.within("[1]").within("content");
        assert_eq!(err.field(), "content[1].api_name");
    }

    #[test]
    fn test_for_endpoint_keeps_field() {
        let err = FieldError::UnsupportedType {
            field: "total".to_string(),
            found: "object",
        }
        .for_endpoint("list-api-keys");

        assert_eq!(err.endpoint(), Some("list-api-keys"));
        assert!(err.to_string().contains("`total`"));
    }

    #[test]
    fn test_status_only_for_status_errors() {
        let err = AdapterError::Transport {
            endpoint: "get-product".to_string(),
            source: TransportError::Status {
                status: 404,
                body: String::new(),
            },
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(AdapterError::UnknownEndpoint("x".into()).status(), None);
    }
}
