//! Input binding: value sources and the boundary error type
//!
//! Core validation depends only on the [`ValueSource`] capability: given a
//! field name, yield the bound value or nothing. `None` from `lookup` is
//! the "not specified" sentinel; an explicit `Value::Null` is a present,
//! blank value.
//!
//! Two adapter families cover the input shapes:
//! - keyed mappings: JSON objects and std maps of `String` to `Value`
//! - records: any `serde::Serialize` value whose serialization is a JSON
//!   object, adapted via [`record_source`]

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors adapting a record into a value source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The record could not be serialized
    #[error("record cannot be used as a value source: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The record serialized to something other than an object
    #[error("record must serialize to an object, got {0}")]
    NotAnObject(&'static str),
}

/// Capability interface for input binding: yield the value bound to a
/// field name, or `None` when the input has no entry for it.
pub trait ValueSource {
    fn lookup(&self, field: &str) -> Option<Value>;
}

impl ValueSource for Map<String, Value> {
    fn lookup(&self, field: &str) -> Option<Value> {
        self.get(field).cloned()
    }
}

/// A non-object `Value` binds nothing.
impl ValueSource for Value {
    fn lookup(&self, field: &str) -> Option<Value> {
        match self {
            Value::Object(entries) => entries.get(field).cloned(),
            _ => None,
        }
    }
}

impl ValueSource for HashMap<String, Value> {
    fn lookup(&self, field: &str) -> Option<Value> {
        self.get(field).cloned()
    }
}

impl ValueSource for BTreeMap<String, Value> {
    fn lookup(&self, field: &str) -> Option<Value> {
        self.get(field).cloned()
    }
}

/// Adapts any serializable record into a mapping source by serializing it
/// to a JSON object. Public readable members become field bindings.
///
/// # Errors
///
/// Returns [`SourceError`] if serialization fails or yields a non-object.
pub fn record_source<T: Serialize>(record: &T) -> Result<Map<String, Value>, SourceError> {
    match serde_json::to_value(record)? {
        Value::Object(entries) => Ok(entries),
        other => Err(SourceError::NotAnObject(json_type_name(&other))),
    }
}

/// JSON kind name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_value_lookup() {
        let data = json!({"foo": 1, "bar": null});
        assert_eq!(data.lookup("foo"), Some(json!(1)));
        // Explicit null is a present value, not the sentinel.
        assert_eq!(data.lookup("bar"), Some(Value::Null));
        assert_eq!(data.lookup("baz"), None);
    }

    #[test]
    fn test_non_object_value_binds_nothing() {
        let data = json!([1, 2, 3]);
        assert_eq!(data.lookup("foo"), None);
    }

    #[test]
    fn test_std_map_lookup() {
        let mut data = HashMap::new();
        data.insert("foo".to_string(), json!("x"));
        assert_eq!(data.lookup("foo"), Some(json!("x")));
        assert_eq!(data.lookup("bar"), None);
    }

    #[test]
    fn test_record_source_from_struct() {
        #[derive(Serialize)]
        struct Signup {
            name: &'static str,
            age: u32,
        }

        let source = record_source(&Signup { name: "Ada", age: 36 }).unwrap();
        assert_eq!(source.lookup("name"), Some(json!("Ada")));
        assert_eq!(source.lookup("age"), Some(json!(36)));
    }

    #[test]
    fn test_record_source_rejects_non_object() {
        let err = record_source(&42).unwrap_err();
        assert!(matches!(err, SourceError::NotAnObject("number")));
    }
}
