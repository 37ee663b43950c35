//! Normalized value types shared by input validation and row decoding.
//!
//! Every value that crosses the engine boundary, in either direction, is one
//! of the five shapes of [`Value`]. Consumers pattern-match exhaustively
//! instead of inspecting dynamic types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};

/// Normalized runtime value.
///
/// Serializes to the natural JSON shape (number, string, bool, null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),

    /// Double precision floating point.
    Float(f64),

    /// UTF-8 text.
    Text(String),

    /// Boolean. Never accepted as input, but drivers may report it.
    Bool(bool),

    /// SQL NULL.
    Null,
}

impl Value {
    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
        }
    }

    /// Integer payload, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One row's data: column name to normalized value.
///
/// Backed by a `BTreeMap` so iteration, and therefore the column order of
/// synthesized statements, is deterministic.
pub type Record = BTreeMap<String, Value>;

/// Convert a decoded JSON body into a [`Record`].
///
/// The body must be a flat object; nested arrays and objects are rejected
/// because no column type accepts them.
pub fn record_from_json(body: serde_json::Value) -> Result<Record> {
    let object = match body {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(ExplorerError::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut record = Record::new();
    for (column, value) in object {
        let value = match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                // u64 beyond i64::MAX and fractional numbers both land here
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            nested => {
                return Err(ExplorerError::InvalidBody(format!(
                    "field {} has unsupported {} value",
                    column,
                    json_kind(&nested)
                )))
            }
        };
        record.insert(column, value);
    }
    Ok(record)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json_kinds() {
        let record = record_from_json(json!({
            "id": 7,
            "name": "Alice",
            "score": 1.5,
            "active": true,
            "note": null
        }))
        .unwrap();

        assert_eq!(record["id"], Value::Integer(7));
        assert_eq!(record["name"], Value::Text("Alice".into()));
        assert_eq!(record["score"], Value::Float(1.5));
        assert_eq!(record["active"], Value::Bool(true));
        assert_eq!(record["note"], Value::Null);
    }

    #[test]
    fn test_record_from_json_rejects_non_object() {
        let err = record_from_json(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidBody(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_record_from_json_rejects_nested() {
        let err = record_from_json(json!({"tags": ["a"]})).unwrap_err();
        assert!(err.to_string().contains("field tags"));
    }

    #[test]
    fn test_value_serializes_to_plain_json() {
        let mut record = Record::new();
        record.insert("id".into(), Value::Integer(1));
        record.insert("name".into(), Value::Text("Alice".into()));
        record.insert("age".into(), Value::Null);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, json!({"id": 1, "name": "Alice", "age": null}));
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }
}
