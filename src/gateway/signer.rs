//! Request signing hook
//!
//! Signature algorithms belong to the surrounding runtime; the transport
//! only asks a [`Signer`] for the headers to attach to each request.

use crate::endpoint::HttpMethod;
use crate::error::TransportError;
use std::fmt;
use url::Url;

/// Default header carrying the gateway API key
pub const API_KEY_HEADER: &str = "x-apigw-api-key";

pub trait Signer: Send + Sync {
    /// Headers to attach to a request for `url` (query included)
    fn sign(&self, method: HttpMethod, url: &Url) -> Result<Vec<(String, String)>, TransportError>;
}

/// Sends requests unsigned
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl Signer for NoAuth {
    fn sign(&self, _method: HttpMethod, _url: &Url) -> Result<Vec<(String, String)>, TransportError> {
        Ok(Vec::new())
    }
}

/// Attaches a static API key header
#[derive(Clone)]
pub struct ApiKeySigner {
    header: String,
    key: String,
}

impl ApiKeySigner {
    pub fn new(key: &str) -> Self {
        Self::with_header(API_KEY_HEADER, key)
    }

    pub fn with_header(header: &str, key: &str) -> Self {
        Self {
            header: header.to_string(),
            key: key.to_string(),
        }
    }
}

impl Signer for ApiKeySigner {
    fn sign(&self, _method: HttpMethod, _url: &Url) -> Result<Vec<(String, String)>, TransportError> {
        if self.key.is_empty() {
            return Err(TransportError::Signer("API key is empty".to_string()));
        }
        Ok(vec![(self.header.clone(), self.key.clone())])
    }
}

// Security: never print the key itself
impl fmt::Debug for ApiKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeySigner")
            .field("header", &self.header)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://gateway.example.com/api/v1/products").unwrap()
    }

    #[test]
    fn test_api_key_header() {
        let headers = ApiKeySigner::new("secret").sign(HttpMethod::Get, &url()).unwrap();
        assert_eq!(headers, vec![(API_KEY_HEADER.to_string(), "secret".to_string())]);
    }

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(ApiKeySigner::new("").sign(HttpMethod::Get, &url()).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", ApiKeySigner::new("secret"));
        assert!(!debug.contains("secret"));
    }
}
