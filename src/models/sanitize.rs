//! # Body Sanitizer
//!
//! Runs on every JSON request body before it reaches a model.
//! Keys beginning with `$` are refused outright; `<` and `>` inside
//! string values are entity-escaped.

use serde_json::{Map, Value};

use super::errors::{ModelError, ModelResult};

/// Sanitize a request body in place
pub fn sanitize_body(body: Value) -> ModelResult<Value> {
    match body {
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, value) in fields {
                if key.starts_with('$') {
                    return Err(ModelError::ForbiddenKey(key));
                }
                out.insert(key, sanitize_body(value)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .into_iter()
            .map(sanitize_body)
            .collect::<ModelResult<Vec<_>>>()
            .map(Value::Array),
        Value::String(s) => Ok(Value::String(escape_html(&s))),
        other => Ok(other),
    }
}

fn escape_html(input: &str) -> String {
    if !input.contains(['<', '>']) {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
