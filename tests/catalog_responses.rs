//! Materialization checks across the whole builtin catalog
//!
//! Every endpoint's response shape is filled with a vendor-cased body. A
//! complete body must come back with no nulls, and dropping any single key
//! must null exactly that field while keeping its declared type.

use apigw_bridge::case::to_camel_case;
use apigw_bridge::endpoint::{builtin, FieldType, ScalarKind, Shape};
use apigw_bridge::materialize::{materialize_response, Field, Record};
use serde_json::{Map, Value};

fn sample_scalar(kind: ScalarKind) -> Value {
    match kind {
        ScalarKind::String => Value::from("x"),
        ScalarKind::Int32 => Value::from(7),
        ScalarKind::Int64 => Value::from(42_i64),
        ScalarKind::Float64 => Value::from(1.5),
        ScalarKind::Bool => Value::Bool(false),
    }
}

fn sample_field(ty: &FieldType) -> Value {
    match ty {
        FieldType::Scalar(kind) => sample_scalar(*kind),
        FieldType::Object(shape) => sample_object(shape),
        FieldType::List(shape) => Value::Array(vec![sample_object(shape)]),
    }
}

/// Body with every declared field set, keys in the vendor's camelCase
fn sample_object(shape: &Shape) -> Value {
    let map: Map<String, Value> = shape
        .fields()
        .iter()
        .map(|field| (to_camel_case(&field.name), sample_field(&field.ty)))
        .collect();
    Value::Object(map)
}

/// Every field path in `shape`, with its declared type
fn field_paths(shape: &Shape, prefix: &[String], out: &mut Vec<(Vec<String>, FieldType)>) {
    for field in shape.fields() {
        let mut path = prefix.to_vec();
        path.push(field.name.clone());
        match &field.ty {
            FieldType::Object(nested) | FieldType::List(nested) => field_paths(nested, &path, out),
            FieldType::Scalar(_) => {}
        }
        out.push((path, field.ty.clone()));
    }
}

/// Remove the key at `path` from a sample body, stepping into the first list element
fn remove_key(raw: &mut Value, path: &[String]) {
    let (last, parents) = path.split_last().unwrap();
    let mut current = raw;
    for name in parents {
        current = current.get_mut(to_camel_case(name)).unwrap();
        if current.is_array() {
            current = current.get_mut(0).unwrap();
        }
    }
    current
        .as_object_mut()
        .unwrap()
        .remove(&to_camel_case(last))
        .unwrap();
}

fn lookup<'a>(record: &'a Record, path: &[String]) -> &'a Field {
    let (last, parents) = path.split_last().unwrap();
    let mut current = record;
    for name in parents {
        let field = current.get(name).unwrap();
        current = match field.items() {
            Some(items) => &items[0],
            None => field.record().unwrap(),
        };
    }
    current.get(last).unwrap()
}

/// Null fields at any depth; a null object or list counts once
fn count_nulls(record: &Record) -> usize {
    record
        .iter()
        .map(|(_, field)| {
            if field.is_null() {
                return 1;
            }
            match field {
                Field::Object { .. } => field.record().map_or(0, count_nulls),
                Field::List { .. } => field
                    .items()
                    .map_or(0, |items| items.iter().map(count_nulls).sum()),
                Field::Scalar { .. } => 0,
            }
        })
        .sum()
}

#[test]
fn test_full_bodies_have_no_nulls() {
    let registry = builtin();
    for endpoint in registry.iter() {
        let raw = sample_object(&endpoint.response);
        let response = materialize_response(endpoint, Some(raw))
            .unwrap_or_else(|e| panic!("{}: {}", endpoint.key, e));

        assert_eq!(response.len(), endpoint.response.len(), "{}", endpoint.key);
        assert_eq!(count_nulls(&response), 0, "{}", endpoint.key);
    }
}

#[test]
fn test_each_missing_key_nulls_only_that_field() {
    let registry = builtin();
    for endpoint in registry.iter() {
        let mut paths = Vec::new();
        field_paths(&endpoint.response, &[], &mut paths);

        for (path, declared) in paths {
            let label = format!("{} {}", endpoint.key, path.join("."));
            let mut raw = sample_object(&endpoint.response);
            remove_key(&mut raw, &path);

            let response = materialize_response(endpoint, Some(raw))
                .unwrap_or_else(|e| panic!("{}: {}", label, e));

            let field = lookup(&response, &path);
            assert!(field.is_null(), "{}", label);
            assert_eq!(field.field_type(), declared, "{}", label);
            assert_eq!(count_nulls(&response), 1, "{}", label);
        }
    }
}
