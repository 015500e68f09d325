//! Descriptor-driven request building and response materialization for an
//! API gateway's REST API.
//!
//! Each operation is described by an [`Endpoint`](endpoint::Endpoint) in an
//! embedded catalog. A [`GatewayClient`](gateway::GatewayClient) renders the
//! path, query and body from a [`Request`](endpoint::Request), sends it through
//! a [`Transport`](gateway::Transport), and materializes the JSON answer into a
//! typed [`Record`](materialize::Record) where every declared field is present,
//! either with a value or as a null of its declared type.

pub mod case;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod materialize;
pub mod native;

pub use endpoint::{get_endpoint, Endpoint, EndpointRegistry, Request};
pub use error::{AdapterError, FieldError, Result, TransportError};
pub use gateway::{CallContext, GatewayClient, HttpTransport, Transport};
pub use materialize::{materialize_response, Field, Record, Scalar, TypedResponse};
pub use native::{to_native, AttrType, AttrValue};
