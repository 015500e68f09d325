//! Typed, null-aware records
//!
//! [`materialize`] turns a normalized raw response into a [`Record`] whose
//! fields follow the declared [`Shape`] exactly: every declared field is
//! present, and absent values are typed nulls that still carry their kind or
//! nested shape.

use super::scalar::{value_kind, Scalar};
use crate::endpoint::{FieldType, ScalarKind, Shape};
use crate::error::FieldError;
use serde_json::{Map, Value};
use std::sync::Arc;

/// One materialized field
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar {
        kind: ScalarKind,
        value: Option<Scalar>,
    },
    Object {
        shape: Arc<Shape>,
        value: Option<Record>,
    },
    /// List of objects. An empty list from the vendor materializes as null.
    List {
        shape: Arc<Shape>,
        items: Option<Vec<Record>>,
    },
}

impl Field {
    /// Typed null for a declared field type
    pub fn null(ty: &FieldType) -> Self {
        match ty {
            FieldType::Scalar(kind) => Field::Scalar {
                kind: *kind,
                value: None,
            },
            FieldType::Object(shape) => Field::Object {
                shape: Arc::clone(shape),
                value: None,
            },
            FieldType::List(shape) => Field::List {
                shape: Arc::clone(shape),
                items: None,
            },
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Field::Scalar { value, .. } => value.is_none(),
            Field::Object { value, .. } => value.is_none(),
            Field::List { items, .. } => items.is_none(),
        }
    }

    /// The declared type this field was materialized against
    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Scalar { kind, .. } => FieldType::Scalar(*kind),
            Field::Object { shape, .. } => FieldType::Object(Arc::clone(shape)),
            Field::List { shape, .. } => FieldType::List(Arc::clone(shape)),
        }
    }

    pub fn scalar(&self) -> Option<&Scalar> {
        match self {
            Field::Scalar { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Field::Object { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[Record]> {
        match self {
            Field::List { items, .. } => items.as_deref(),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Field::Scalar { value, .. } => value.as_ref().map_or(Value::Null, Scalar::to_json),
            Field::Object { value, .. } => value.as_ref().map_or(Value::Null, Record::to_json),
            Field::List { items, .. } => items.as_ref().map_or(Value::Null, |items| {
                Value::Array(items.iter().map(Record::to_json).collect())
            }),
        }
    }
}

/// Materialized object, fields in declared order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Field)>,
}

impl Record {
    /// A record with every field of `shape` set to its typed null
    pub fn null_of(shape: &Shape) -> Self {
        Self {
            fields: shape
                .fields()
                .iter()
                .map(|f| (f.name.clone(), Field::null(&f.ty)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the top-level fields that are null
    pub fn null_fields(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, f)| f.is_null())
            .map(|(n, _)| n)
            .collect()
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name)?.scalar()?.as_str()
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.scalar()?.as_i64()
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name)?.scalar()?.as_f64()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.scalar()?.as_bool()
    }

    pub fn record(&self, name: &str) -> Option<&Record> {
        self.get(name)?.record()
    }

    pub fn items(&self, name: &str) -> Option<&[Record]> {
        self.get(name)?.items()
    }

    /// Render back to JSON, nulls included
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(n, f)| (n.clone(), f.to_json()))
                .collect(),
        )
    }
}

/// Drop every key not declared in `shape`
pub fn filter_to_shape(shape: &Shape, raw: &Map<String, Value>) -> Map<String, Value> {
    raw.iter()
        .filter(|(k, _)| shape.contains(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Materialize a raw object against a shape.
///
/// The raw value must already have snake_case keys. Any field failure aborts
/// the whole record.
pub fn materialize(shape: &Shape, raw: &Value) -> Result<Record, FieldError> {
    match raw {
        Value::Object(map) => materialize_record(shape, map),
        Value::Null => Ok(Record::null_of(shape)),
        other => Err(FieldError::TypeMismatch {
            field: "$".to_string(),
            expected: "object",
            found: value_kind(other),
        }),
    }
}

/// Materialize a raw map against a shape after allow-list filtering
pub fn materialize_record(shape: &Shape, raw: &Map<String, Value>) -> Result<Record, FieldError> {
    let filtered = filter_to_shape(shape, raw);
    let mut fields = Vec::with_capacity(shape.len());

    for def in shape.fields() {
        let field = match filtered.get(&def.name) {
            None | Some(Value::Null) => Field::null(&def.ty),
            Some(value) => materialize_field(&def.name, &def.ty, value)?,
        };
        fields.push((def.name.clone(), field));
    }

    Ok(Record { fields })
}

fn materialize_field(name: &str, ty: &FieldType, value: &Value) -> Result<Field, FieldError> {
    let mismatch = |expected: &'static str| FieldError::TypeMismatch {
        field: name.to_string(),
        expected,
        found: value_kind(value),
    };

    match ty {
        FieldType::Scalar(kind) => {
            let scalar = match Scalar::coerce(value, name) {
                Ok(Some(scalar)) => scalar.into_kind(*kind, name)?,
                Ok(None) => return Ok(Field::null(ty)),
                Err(FieldError::UnsupportedType { .. }) => return Err(mismatch(kind.as_str())),
                Err(other) => return Err(other),
            };
            Ok(Field::Scalar {
                kind: *kind,
                value: Some(scalar),
            })
        }
        FieldType::Object(shape) => {
            let Value::Object(map) = value else {
                return Err(mismatch("object"));
            };
            let record = materialize_record(shape, map).map_err(|e| e.within(name))?;
            Ok(Field::Object {
                shape: Arc::clone(shape),
                value: Some(record),
            })
        }
        FieldType::List(shape) => {
            let Value::Array(elements) = value else {
                return Err(mismatch("list"));
            };
            if elements.is_empty() {
                return Ok(Field::null(ty));
            }

            let mut items = Vec::with_capacity(elements.len());
            for (idx, element) in elements.iter().enumerate() {
                let Value::Object(map) = element else {
                    return Err(FieldError::TypeMismatch {
                        field: format!("{}[{}]", name, idx),
                        expected: "object",
                        found: value_kind(element),
                    });
                };
                let record = materialize_record(shape, map)
                    .map_err(|e| e.within(&format!("[{}]", idx)).within(name))?;
                items.push(record);
            }
            Ok(Field::List {
                shape: Arc::clone(shape),
                items: Some(items),
            })
        }
    }
}
