//! # Field Projection

use serde_json::{Map, Value};

use super::filter::resolve_path;

/// Identifier field kept by every projection
pub const ID_FIELD: &str = "_id";

/// Keep only `fields` (plus `_id`) of a document.
///
/// Dotted paths keep the nested value under the same nesting.
/// Fields the document lacks are skipped.
pub fn project(doc: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();

    if let Some(id) = doc.get(ID_FIELD) {
        out.insert(ID_FIELD.to_string(), id.clone());
    }

    for field in fields {
        if let Some(value) = resolve_path(doc, field) {
            insert_path(&mut out, field, value.clone());
        }
    }

    Value::Object(out)
}

fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}
