//! Endpoint Registry - Load endpoint descriptors from JSON
//!
//! This module loads the gateway endpoint catalog from embedded JSON files,
//! resolves named response shapes, and provides lookup functions for the
//! rest of the crate. Extra catalog documents (JSON or YAML) can be layered
//! on top with [`CatalogBuilder`].

use super::descriptor::{
    BodyField, BodyKind, Endpoint, FieldDef, FieldType, HttpMethod, Pagination, PathParam,
    QueryParam, ScalarKind, Shape,
};
use crate::case::to_camel_case;
use crate::error::{AdapterError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Embedded catalog files (compiled into the binary)
const CATALOG_FILES: &[(&str, &str)] = &[
    ("common.json", include_str!("../resources/common.json")),
    ("products.json", include_str!("../resources/products.json")),
    ("apis.json", include_str!("../resources/apis.json")),
    ("stages.json", include_str!("../resources/stages.json")),
    ("api_keys.json", include_str!("../resources/api_keys.json")),
    ("usage_plans.json", include_str!("../resources/usage_plans.json")),
];

/// Field type tag as written in the catalog
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TypeTag {
    String,
    Int32,
    Int64,
    Float64,
    Bool,
    Object,
    List,
}

/// Nested fields: either a named shape or an inline field list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ShapeSpec {
    Named(String),
    Inline(Vec<FieldSpec>),
}

/// Response field definition from JSON
#[derive(Debug, Clone, Deserialize)]
struct FieldSpec {
    name: String,
    #[serde(rename = "type")]
    ty: TypeTag,
    #[serde(default)]
    fields: Option<ShapeSpec>,
}

/// Query parameter definition from JSON
#[derive(Debug, Clone, Deserialize)]
struct QueryParamSpec {
    name: String,
    /// Wire key, defaults to the camelCase form of `name`
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    required: bool,
}

fn default_body_kind() -> BodyKind {
    BodyKind::String
}

/// Body field definition from JSON
#[derive(Debug, Clone, Deserialize)]
struct BodyFieldSpec {
    name: String,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default = "default_body_kind")]
    kind: BodyKind,
}

/// Endpoint definition from JSON
#[derive(Debug, Clone, Deserialize)]
struct EndpointSpec {
    #[serde(default)]
    description: String,
    method: HttpMethod,
    path: String,
    #[serde(default)]
    query_params: Vec<QueryParamSpec>,
    #[serde(default)]
    body_fields: Vec<BodyFieldSpec>,
    #[serde(default)]
    response: Option<ShapeSpec>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    shapes: HashMap<String, Vec<FieldSpec>>,
    #[serde(default)]
    endpoints: HashMap<String, EndpointSpec>,
}

/// Collects catalog documents and resolves them into an [`EndpointRegistry`].
///
/// Later documents override shapes and endpoints of earlier ones with the
/// same key.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    shapes: HashMap<String, Vec<FieldSpec>>,
    endpoints: BTreeMap<String, EndpointSpec>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the embedded gateway catalog
    pub fn with_builtin(mut self) -> Result<Self> {
        for (name, content) in CATALOG_FILES {
            let doc: CatalogDocument = serde_json::from_str(content)
                .map_err(|e| AdapterError::Catalog(format!("{}: {}", name, e)))?;
            self = self.add_document(doc);
        }
        Ok(self)
    }

    pub fn add_json(self, content: &str) -> Result<Self> {
        let doc: CatalogDocument =
            serde_json::from_str(content).map_err(|e| AdapterError::Catalog(e.to_string()))?;
        Ok(self.add_document(doc))
    }

    pub fn add_yaml(self, content: &str) -> Result<Self> {
        let doc: CatalogDocument =
            serde_yaml::from_str(content).map_err(|e| AdapterError::Catalog(e.to_string()))?;
        Ok(self.add_document(doc))
    }

    /// Add a catalog file; `.yaml`/`.yml` files are read as YAML, anything else as JSON
    pub fn add_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AdapterError::Catalog(format!("{}: {}", path.display(), e)))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let result = if is_yaml {
            self.add_yaml(&content)
        } else {
            self.add_json(&content)
        };
        result.map_err(|e| match e {
            AdapterError::Catalog(msg) => {
                AdapterError::Catalog(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn add_document(mut self, doc: CatalogDocument) -> Self {
        self.shapes.extend(doc.shapes);
        self.endpoints.extend(doc.endpoints);
        self
    }

    /// Resolve every endpoint into its immutable descriptor
    pub fn build(self) -> Result<EndpointRegistry> {
        let mut resolver = ShapeResolver {
            specs: &self.shapes,
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
        };

        let mut endpoints = BTreeMap::new();
        for (key, spec) in &self.endpoints {
            let endpoint = resolve_endpoint(key, spec, &mut resolver)
                .map_err(|reason| AdapterError::Catalog(format!("endpoint {}: {}", key, reason)))?;
            endpoints.insert(key.clone(), Arc::new(endpoint));
        }

        tracing::debug!(
            "Endpoint catalog built: {} endpoints, {} named shapes",
            endpoints.len(),
            self.shapes.len()
        );

        Ok(EndpointRegistry { endpoints })
    }
}

/// Resolves named shapes once and shares them between endpoints
struct ShapeResolver<'a> {
    specs: &'a HashMap<String, Vec<FieldSpec>>,
    resolved: HashMap<String, Arc<Shape>>,
    in_progress: HashSet<String>,
}

impl ShapeResolver<'_> {
    fn resolve(&mut self, spec: &ShapeSpec) -> std::result::Result<Arc<Shape>, String> {
        match spec {
            ShapeSpec::Inline(fields) => Ok(Arc::new(self.resolve_fields(fields)?)),
            ShapeSpec::Named(name) => self.resolve_named(name),
        }
    }

    fn resolve_named(&mut self, name: &str) -> std::result::Result<Arc<Shape>, String> {
        if let Some(shape) = self.resolved.get(name) {
            return Ok(Arc::clone(shape));
        }
        let specs = self.specs;
        let Some(fields) = specs.get(name) else {
            return Err(format!("unknown shape `{}`", name));
        };
        if !self.in_progress.insert(name.to_string()) {
            return Err(format!("shape `{}` references itself", name));
        }
        let shape = Arc::new(self.resolve_fields(fields)?);
        self.in_progress.remove(name);
        self.resolved.insert(name.to_string(), Arc::clone(&shape));
        Ok(shape)
    }

    fn resolve_fields(&mut self, fields: &[FieldSpec]) -> std::result::Result<Shape, String> {
        let mut seen = HashSet::new();
        let mut defs = Vec::with_capacity(fields.len());

        for field in fields {
            if !seen.insert(field.name.as_str()) {
                return Err(format!("duplicate field `{}`", field.name));
            }
            let ty = match field.ty {
                TypeTag::String => FieldType::Scalar(ScalarKind::String),
                TypeTag::Int32 => FieldType::Scalar(ScalarKind::Int32),
                TypeTag::Int64 => FieldType::Scalar(ScalarKind::Int64),
                TypeTag::Float64 => FieldType::Scalar(ScalarKind::Float64),
                TypeTag::Bool => FieldType::Scalar(ScalarKind::Bool),
                TypeTag::Object | TypeTag::List => {
                    let Some(nested) = &field.fields else {
                        return Err(format!("field `{}` has no nested fields", field.name));
                    };
                    let shape = self.resolve(nested)?;
                    if matches!(field.ty, TypeTag::Object) {
                        FieldType::Object(shape)
                    } else {
                        FieldType::List(shape)
                    }
                }
            };
            defs.push(FieldDef {
                name: field.name.clone(),
                ty,
            });
        }

        Ok(Shape::new(defs))
    }
}

/// Extract `{placeholder}` names from a path template
fn parse_placeholders(path: &str) -> std::result::Result<Vec<String>, String> {
    let mut placeholders = Vec::new();
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            return Err(format!("unterminated placeholder in `{}`", path));
        };
        let name = &after[..end];
        if name.is_empty() || name.contains('{') {
            return Err(format!("malformed placeholder in `{}`", path));
        }
        placeholders.push(name.to_string());
        rest = &after[end + 1..];
    }

    if rest.contains('}') {
        return Err(format!("unmatched `}}` in `{}`", path));
    }
    Ok(placeholders)
}

fn resolve_endpoint(
    key: &str,
    spec: &EndpointSpec,
    resolver: &mut ShapeResolver<'_>,
) -> std::result::Result<Endpoint, String> {
    if !spec.path.starts_with('/') {
        return Err(format!("path `{}` must start with `/`", spec.path));
    }

    let path_params = parse_placeholders(&spec.path)?
        .into_iter()
        .map(|placeholder| PathParam {
            name: placeholder.replace('-', "_"),
            placeholder,
        })
        .collect::<Vec<_>>();

    let query_params = spec
        .query_params
        .iter()
        .map(|q| QueryParam {
            name: q.name.clone(),
            key: q.key.clone().unwrap_or_else(|| to_camel_case(&q.name)),
            required: q.required,
        })
        .collect::<Vec<_>>();

    let body_fields = spec
        .body_fields
        .iter()
        .map(|b| BodyField {
            name: b.name.clone(),
            key: b.key.clone().unwrap_or_else(|| to_camel_case(&b.name)),
            required: b.required,
            kind: b.kind,
        })
        .collect::<Vec<_>>();

    let mut names = HashSet::new();
    let all_names = path_params
        .iter()
        .map(|p| &p.name)
        .chain(query_params.iter().map(|q| &q.name))
        .chain(body_fields.iter().map(|b| &b.name));
    for name in all_names {
        if !names.insert(name.as_str()) {
            return Err(format!("request field `{}` declared twice", name));
        }
    }

    let response = match &spec.response {
        Some(shape) => resolver.resolve(shape)?,
        None => Arc::new(Shape::default()),
    };

    if let Some(pagination) = &spec.pagination {
        for param in [&pagination.offset_param, &pagination.limit_param] {
            if !query_params.iter().any(|q| &q.name == param) {
                return Err(format!("pagination parameter `{}` is not a query parameter", param));
            }
        }
        if !matches!(lookup_path(&response, &pagination.items_path), Some(FieldType::List(_))) {
            return Err(format!("pagination items path `{}` is not a list", pagination.items_path));
        }
        if !matches!(
            lookup_path(&response, &pagination.total_path),
            Some(FieldType::Scalar(ScalarKind::Int32 | ScalarKind::Int64))
        ) {
            return Err(format!(
                "pagination total path `{}` is not an integer",
                pagination.total_path
            ));
        }
    }

    Ok(Endpoint {
        key: key.to_string(),
        description: spec.description.clone(),
        method: spec.method,
        path: spec.path.clone(),
        path_params,
        query_params,
        body_fields,
        response,
        pagination: spec.pagination.clone(),
    })
}

/// Find the type of a dotted field path inside a shape
fn lookup_path<'a>(shape: &'a Shape, path: &str) -> Option<&'a FieldType> {
    let mut parts = path.split('.').peekable();
    let mut current = shape;
    while let Some(part) = parts.next() {
        let field = current.field(part)?;
        if parts.peek().is_none() {
            return Some(&field.ty);
        }
        match &field.ty {
            FieldType::Object(nested) => current = nested.as_ref(),
            _ => return None,
        }
    }
    None
}

/// Immutable set of resolved endpoint descriptors
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: BTreeMap<String, Arc<Endpoint>>,
}

impl EndpointRegistry {
    /// Build a registry from a single JSON catalog document
    pub fn from_json_str(content: &str) -> Result<Self> {
        CatalogBuilder::new().add_json(content)?.build()
    }

    /// Get an endpoint descriptor by key
    pub fn get(&self, key: &str) -> Option<&Arc<Endpoint>> {
        self.endpoints.get(key)
    }

    /// Like [`get`](Self::get), but unknown keys are an error
    pub fn endpoint(&self, key: &str) -> Result<&Arc<Endpoint>> {
        self.get(key)
            .ok_or_else(|| AdapterError::UnknownEndpoint(key.to_string()))
    }

    /// All endpoint keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        self.endpoints.keys().map(|s| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.endpoints.values()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Global registry built from the embedded catalog
static REGISTRY: OnceLock<Arc<EndpointRegistry>> = OnceLock::new();

/// Get the built-in registry (resolved from embedded JSON on first access)
pub fn builtin() -> Arc<EndpointRegistry> {
    let registry = REGISTRY.get_or_init(|| {
        let registry = CatalogBuilder::new()
            .with_builtin()
            .and_then(CatalogBuilder::build)
            .unwrap_or_else(|e| panic!("Failed to load embedded endpoint catalog: {}", e));
        Arc::new(registry)
    });
    Arc::clone(registry)
}

/// Get a built-in endpoint descriptor by key
pub fn get_endpoint(key: &str) -> Option<Arc<Endpoint>> {
    builtin().get(key).cloned()
}
