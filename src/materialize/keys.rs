//! Response key normalization

use crate::case::to_snake_case;
use serde_json::{Map, Value};

/// Rewrite every object key in the tree to snake_case.
///
/// Objects nested inside lists are rewritten the same way as top-level ones.
/// If two vendor keys collapse onto the same snake_case key, the one that
/// was already canonical wins.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn normalize_map(map: Map<String, Value>) -> Map<String, Value> {
    let mut normalized = Map::with_capacity(map.len());
    for (key, value) in map {
        let snake = to_snake_case(&key);
        let canonical = snake == key;
        if !canonical && normalized.contains_key(&snake) {
            continue;
        }
        normalized.insert(snake, normalize_keys(value));
    }
    normalized
}
