//! Gateway API interaction module
//!
//! This module sends prepared endpoint calls to the API gateway and hands the
//! answers to the materializer.
//!
//! # Module Structure
//!
//! - [`transport`] - The transport seam and per-call context
//! - [`http`] - reqwest-backed transport and error formatting
//! - [`signer`] - Request signing hook
//! - [`client`] - Main client for invoking endpoints
//! - [`pager`] - Offset/limit pagination over list endpoints
//!
//! # Example
//!
//! ```ignore
//! use apigw_bridge::gateway::{
//!     ApiKeySigner, CallContext, GatewayClient, HttpTransport, DEFAULT_USER_AGENT,
//! };
//! use apigw_bridge::Request;
//! use std::sync::Arc;
//!
//! async fn example() -> apigw_bridge::Result<()> {
//!     let signer = Arc::new(ApiKeySigner::new("key"));
//!     let transport = HttpTransport::new(DEFAULT_USER_AGENT, signer)?;
//!     let client = GatewayClient::new("https://gateway.example.com/api/v1", Arc::new(transport))?;
//!     let request = Request::new().set("product_id", "p1");
//!     let apis = client.execute_key(&CallContext::new(), "list-apis", &request).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod pager;
pub mod signer;
pub mod transport;

pub use client::GatewayClient;
pub use http::{format_gateway_error, HttpTransport, DEFAULT_USER_AGENT};
pub use pager::{fetch_all_pages, fetch_page, PageResult, MAX_PAGES};
pub use signer::{ApiKeySigner, NoAuth, Signer, API_KEY_HEADER};
pub use transport::{CallContext, Transport};
