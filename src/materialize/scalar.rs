//! Scalar values and coercion from raw JSON

use crate::endpoint::ScalarKind;
use crate::error::FieldError;
use serde_json::Value;
use std::fmt;

/// Runtime type name of a raw JSON value
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float64",
        Value::Number(_) => "int64",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A decoded scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Bool(bool),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::String(_) => ScalarKind::String,
            Scalar::Int32(_) => ScalarKind::Int32,
            Scalar::Int64(_) => ScalarKind::Int64,
            Scalar::Float64(_) => ScalarKind::Float64,
            Scalar::Bool(_) => ScalarKind::Bool,
        }
    }

    /// Decode a raw value into its natural scalar.
    ///
    /// Integers decode as `Int64` (or `Float64` past `i64::MAX`), other
    /// numbers as `Float64`. `null` yields `None`; the caller decides which
    /// kind of null it stands for. Arrays and objects have no scalar form.
    pub fn coerce(value: &Value, field: &str) -> Result<Option<Scalar>, FieldError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(Scalar::String(s.clone()))),
            Value::Bool(b) => Ok(Some(Scalar::Bool(*b))),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(Some(Scalar::Int64(i))),
                (None, Some(f)) => Ok(Some(Scalar::Float64(f))),
                (None, None) => Err(FieldError::UnsupportedType {
                    field: field.to_string(),
                    found: "number",
                }),
            },
            Value::Array(_) | Value::Object(_) => Err(FieldError::UnsupportedType {
                field: field.to_string(),
                found: value_kind(value),
            }),
        }
    }

    /// Narrow a decoded scalar to the declared kind.
    ///
    /// Integers widen to `Float64`, integral floats narrow to integers, and
    /// `Int32` is range checked. Strings are never parsed into numbers.
    pub fn into_kind(self, kind: ScalarKind, field: &str) -> Result<Scalar, FieldError> {
        let found = self.kind().as_str();
        let mismatch = || FieldError::TypeMismatch {
            field: field.to_string(),
            expected: kind.as_str(),
            found,
        };

        match (kind, self) {
            (ScalarKind::String, s @ Scalar::String(_)) => Ok(s),
            (ScalarKind::Bool, b @ Scalar::Bool(_)) => Ok(b),
            (ScalarKind::Int64, Scalar::Int64(i)) => Ok(Scalar::Int64(i)),
            (ScalarKind::Int64, Scalar::Int32(i)) => Ok(Scalar::Int64(i64::from(i))),
            (ScalarKind::Int64, Scalar::Float64(f)) if is_integral(f, i64::MIN as f64, -(i64::MIN as f64)) => {
                Ok(Scalar::Int64(f as i64))
            }
            (ScalarKind::Int32, Scalar::Int32(i)) => Ok(Scalar::Int32(i)),
            (ScalarKind::Int32, Scalar::Int64(i)) => {
                i32::try_from(i).map(Scalar::Int32).map_err(|_| mismatch())
            }
            (ScalarKind::Int32, Scalar::Float64(f)) if is_integral(f, i32::MIN as f64, f64::from(i32::MAX) + 1.0) => {
                Ok(Scalar::Int32(f as i32))
            }
            (ScalarKind::Float64, Scalar::Float64(f)) => Ok(Scalar::Float64(f)),
            (ScalarKind::Float64, Scalar::Int64(i)) => Ok(Scalar::Float64(i as f64)),
            (ScalarKind::Float64, Scalar::Int32(i)) => Ok(Scalar::Float64(f64::from(i))),
            _ => Err(mismatch()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int32(i) => Some(i64::from(*i)),
            Scalar::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::String(s) => Value::String(s.clone()),
            Scalar::Int32(i) => Value::from(*i),
            Scalar::Int64(i) => Value::from(*i),
            Scalar::Float64(f) => Value::from(*f),
            Scalar::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Whole number in `[min, end)`. The upper bound is exclusive because
/// `i64::MAX` is not representable as `f64` and rounds up to 2^63.
fn is_integral(f: f64, min: f64, end: f64) -> bool {
    f.fract() == 0.0 && f >= min && f < end
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Int32(i) => write!(f, "{}", i),
            Scalar::Int64(i) => write!(f, "{}", i),
            Scalar::Float64(v) => write!(f, "{}", v),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}
