//! Control-plane attribute representation
//!
//! The control plane describes values as attribute types (`string`,
//! `number`-like scalars, `bool`, `object`, `list`) with a first-class null
//! for every type. [`to_native`] re-expresses a typed response in that form.

use crate::endpoint::{FieldType, ScalarKind, Shape};
use crate::materialize::{Field, Record, Scalar};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrType {
    String,
    Int64,
    Float64,
    Bool,
    Object(BTreeMap<String, AttrType>),
    List(Box<AttrType>),
}

impl AttrType {
    pub fn of_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::String => AttrType::String,
            // The control plane has a single integer type
            ScalarKind::Int32 | ScalarKind::Int64 => AttrType::Int64,
            ScalarKind::Float64 => AttrType::Float64,
            ScalarKind::Bool => AttrType::Bool,
        }
    }

    pub fn of_shape(shape: &Shape) -> Self {
        AttrType::Object(
            shape
                .fields()
                .iter()
                .map(|f| (f.name.clone(), AttrType::of_field(&f.ty)))
                .collect(),
        )
    }

    pub fn of_field(ty: &FieldType) -> Self {
        match ty {
            FieldType::Scalar(kind) => AttrType::of_scalar(*kind),
            FieldType::Object(shape) => AttrType::of_shape(shape),
            FieldType::List(shape) => AttrType::List(Box::new(AttrType::of_shape(shape))),
        }
    }
}

/// Attribute value payload
#[derive(Debug, Clone, PartialEq)]
pub enum AttrData {
    String(String),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Object(BTreeMap<String, AttrValue>),
    List(Vec<AttrValue>),
}

/// Typed attribute value; `data` is `None` for a typed null
#[derive(Debug, Clone, PartialEq)]
pub struct AttrValue {
    ty: AttrType,
    data: Option<AttrData>,
}

impl AttrValue {
    pub fn null(ty: AttrType) -> Self {
        Self { ty, data: None }
    }

    pub fn ty(&self) -> &AttrType {
        &self.ty
    }

    pub fn data(&self) -> Option<&AttrData> {
        self.data.as_ref()
    }

    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Attribute of an object value
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        match &self.data {
            Some(AttrData::Object(attrs)) => attrs.get(name),
            _ => None,
        }
    }

    /// Plain JSON view of the value, nulls as `null`
    pub fn to_json(&self) -> Value {
        match &self.data {
            None => Value::Null,
            Some(AttrData::String(s)) => Value::String(s.clone()),
            Some(AttrData::Int64(i)) => Value::from(*i),
            Some(AttrData::Float64(f)) => Value::from(*f),
            Some(AttrData::Bool(b)) => Value::Bool(*b),
            Some(AttrData::Object(attrs)) => Value::Object(
                attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Some(AttrData::List(items)) => {
                Value::Array(items.iter().map(AttrValue::to_json).collect())
            }
        }
    }
}

fn scalar_data(scalar: &Scalar) -> AttrData {
    match scalar {
        Scalar::String(s) => AttrData::String(s.clone()),
        Scalar::Int32(i) => AttrData::Int64(i64::from(*i)),
        Scalar::Int64(i) => AttrData::Int64(*i),
        Scalar::Float64(f) => AttrData::Float64(*f),
        Scalar::Bool(b) => AttrData::Bool(*b),
    }
}

fn field_to_native(field: &Field) -> AttrValue {
    let ty = AttrType::of_field(&field.field_type());
    let data = match field {
        Field::Scalar { value, .. } => value.as_ref().map(scalar_data),
        Field::Object { value, .. } => value.as_ref().map(|r| AttrData::Object(attrs_of(r))),
        Field::List { items, .. } => items
            .as_ref()
            .map(|items| AttrData::List(items.iter().map(record_to_native).collect())),
    };
    AttrValue { ty, data }
}

fn attrs_of(record: &Record) -> BTreeMap<String, AttrValue> {
    record
        .iter()
        .map(|(name, field)| (name.to_string(), field_to_native(field)))
        .collect()
}

fn record_to_native(record: &Record) -> AttrValue {
    let attrs = attrs_of(record);
    let ty = AttrType::Object(
        attrs
            .iter()
            .map(|(name, value)| (name.clone(), value.ty.clone()))
            .collect(),
    );
    AttrValue {
        ty,
        data: Some(AttrData::Object(attrs)),
    }
}

/// Project a typed response into the control plane's attribute form
pub fn to_native(record: &Record) -> AttrValue {
    record_to_native(record)
}
