//! Endpoint descriptors
//!
//! Resolved, immutable definitions of one REST operation: method, path
//! template, parameters, body fields and response shape. The serde-facing
//! catalog format lives in [`super::registry`]; the types here are what the
//! engine works with after named shapes have been resolved.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// HTTP method of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// The five scalar kinds a response field can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Int32,
    Int64,
    Float64,
    Bool,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Float64 => "float64",
            ScalarKind::Bool => "bool",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a request body field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    String,
    Int32,
    Int64,
    Float64,
    Bool,
    /// Array of scalars, sent as-is
    List,
    /// Nested JSON, either structured or pre-serialized into a string
    Json,
}

/// Declared type of a response field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar(ScalarKind),
    Object(Arc<Shape>),
    /// List of objects
    List(Arc<Shape>),
}

impl FieldType {
    /// Short type name used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::Scalar(kind) => kind.as_str(),
            FieldType::Object(_) => "object",
            FieldType::List(_) => "list",
        }
    }
}

/// One named field of a response shape
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

// Same layout as the catalog: `{"name", "type", "fields"?}`
impl Serialize for FieldDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nested = match &self.ty {
            FieldType::Scalar(_) => None,
            FieldType::Object(shape) | FieldType::List(shape) => Some(shape),
        };
        let mut map = serializer.serialize_map(Some(if nested.is_some() { 3 } else { 2 }))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", self.ty.describe())?;
        if let Some(shape) = nested {
            map.serialize_entry("fields", shape.as_ref())?;
        }
        map.end()
    }
}

/// Ordered allow-list of fields for an object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Shape {
    fields: Vec<FieldDef>,
}

impl Shape {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Path parameter: canonical field name and the `{placeholder}` it fills
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathParam {
    pub name: String,
    pub placeholder: String,
}

/// Query parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParam {
    pub name: String,
    /// Wire key sent to the vendor
    pub key: String,
    pub required: bool,
}

/// Request body field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyField {
    pub name: String,
    /// Wire key sent to the vendor
    pub key: String,
    pub required: bool,
    pub kind: BodyKind,
}

/// Offset/limit paging settings of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    /// Request field carrying the offset
    #[serde(default = "default_offset_param")]
    pub offset_param: String,
    /// Request field carrying the page size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,
    /// Dotted path (snake_case) of the item list in the response
    pub items_path: String,
    /// Dotted path (snake_case) of the total count in the response
    pub total_path: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_page_size() -> u32 {
    100
}

/// One REST operation of the gateway API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub key: String,
    pub description: String,
    pub method: HttpMethod,
    pub path: String,
    pub path_params: Vec<PathParam>,
    pub query_params: Vec<QueryParam>,
    pub body_fields: Vec<BodyField>,
    pub response: Arc<Shape>,
    pub pagination: Option<Pagination>,
}

impl Endpoint {
    /// Whether a successful call must return a body
    pub fn expects_body(&self) -> bool {
        !self.response.is_empty()
    }

    /// Whether the endpoint sends a JSON body at all
    pub fn has_body(&self) -> bool {
        !self.body_fields.is_empty()
    }

    /// Names of every field that must be present in a request
    pub fn required_fields(&self) -> Vec<&str> {
        let path = self.path_params.iter().map(|p| p.name.as_str());
        let query = self
            .query_params
            .iter()
            .filter(|q| q.required)
            .map(|q| q.name.as_str());
        let body = self
            .body_fields
            .iter()
            .filter(|b| b.required)
            .map(|b| b.name.as_str());
        path.chain(query).chain(body).collect()
    }
}
