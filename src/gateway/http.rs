//! HTTP transport for gateway REST API calls

use super::signer::Signer;
use super::transport::{CallContext, Transport};
use crate::endpoint::HttpMethod;
use crate::error::{AdapterError, TransportError};
use crate::materialize::value_kind;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("apigw-bridge/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and drops non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Decode a success body: empty or `null` means no body, objects pass through
pub fn decode_body(body: &str) -> Result<Option<Value>, TransportError> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(body)? {
        Value::Null => Ok(None),
        object @ Value::Object(_) => Ok(Some(object)),
        other => Err(TransportError::UnexpectedBody(value_kind(&other))),
    }
}

/// reqwest-backed [`Transport`]
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    signer: Arc<dyn Signer>,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(user_agent: &str, signer: Arc<dyn Signer>) -> Result<Self, TransportError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client, signer })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, signer: Arc<dyn Signer>) -> Self {
        Self { client, signer }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        ctx: &CallContext,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<Option<Value>, TransportError> {
        let mut url = Url::parse(url)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        tracing::debug!("{} {} [request_id={}]", method, url, ctx.request_id);

        let headers = self.signer.sign(method, &url)?;
        let mut request = self
            .client
            .request(method.into(), url)
            .header("X-Request-Id", ctx.request_id.to_string());
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(timeout) = ctx.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            let sanitized = sanitize_for_log(&response_body);
            tracing::error!(
                "API error: {} - {} [request_id={}]",
                status,
                sanitized,
                ctx.request_id
            );
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: sanitized,
            });
        }

        decode_body(&response_body)
    }
}

/// Format a gateway error for display
/// Security: Sanitizes error messages to avoid leaking API details
pub fn format_gateway_error(error: &AdapterError) -> String {
    match error.status() {
        Some(403) => return "Permission denied. Check the API key and its permissions.".to_string(),
        Some(401) => return "Authentication failed. Check the configured API key.".to_string(),
        Some(404) => return "Resource not found.".to_string(),
        Some(409) => {
            return "Resource conflict. The resource may already exist or be in use.".to_string()
        }
        Some(429) => return "Rate limit exceeded. Please try again later.".to_string(),
        Some(400) => return "Invalid request. Check your parameters.".to_string(),
        Some(500..=599) => {
            return "Gateway service temporarily unavailable. Please try again.".to_string()
        }
        Some(_) => {
            return "Request failed. Check your network connection and try again.".to_string()
        }
        None => {}
    }

    // Truncate long error messages and remove potential sensitive data
    let error_str = error.to_string();
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(120)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
