//! Path lookups into semi-structured resource documents.
//!
//! Every lookup distinguishes three outcomes: the value was found with the
//! expected type (`Ok(Some(_))`), some segment of the path is absent or
//! `null` (`Ok(None)`), or a value exists with the wrong type (`Err`).

use serde_json::Value;

use super::TenancyError;

/// Walk `path` through nested objects.
pub fn nested<'a>(doc: &'a Value, path: &[&str]) -> Result<Option<&'a Value>, TenancyError> {
    let mut current = doc;
    for (depth, field) in path.iter().enumerate() {
        let map = match current {
            Value::Object(map) => map,
            Value::Null => return Ok(None),
            other => return Err(wrong_type(&path[..depth], other, "map")),
        };
        match map.get(*field) {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    if current.is_null() {
        Ok(None)
    } else {
        Ok(Some(current))
    }
}

pub fn nested_str<'a>(doc: &'a Value, path: &[&str]) -> Result<Option<&'a str>, TenancyError> {
    match nested(doc, path)? {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(wrong_type(path, other, "string")),
    }
}

pub fn nested_bool(doc: &Value, path: &[&str]) -> Result<Option<bool>, TenancyError> {
    match nested(doc, path)? {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(wrong_type(path, other, "bool")),
    }
}

pub fn nested_slice<'a>(
    doc: &'a Value,
    path: &[&str],
) -> Result<Option<&'a [Value]>, TenancyError> {
    match nested(doc, path)? {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.as_slice())),
        Some(other) => Err(wrong_type(path, other, "array")),
    }
}

fn wrong_type(path: &[&str], value: &Value, expected: &'static str) -> TenancyError {
    TenancyError::WrongType {
        path: format!(".{}", path.join(".")),
        expected,
        actual: type_name(value),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
