//! Typed requests
//!
//! A [`Request`] holds the caller's field values keyed by canonical
//! snake_case name. Presence is explicit: a field counts as present once it
//! has been set to a non-null value, so an optional `0`, `false` or `""` is
//! still sent.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    fields: Map<String, Value>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder style)
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field only when a value is given
    pub fn set_opt<T: Into<Value>>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(name, v),
            None => self,
        }
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Value of a present field; explicit `null` counts as absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Present fields in insertion-independent (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Build a request from a JSON object
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::default()),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "request must be a JSON object, got {}",
                crate::materialize::value_kind(&other)
            ))),
        }
    }

    /// Build a request from any serializable struct.
    ///
    /// `None` fields serialize as `null` (or are skipped with
    /// `skip_serializing_if`) and both count as absent.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::to_value(value)?)
    }
}

impl From<Map<String, Value>> for Request {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
