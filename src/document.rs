//! Document representation and typed field access.
//!
//! A [`Document`] is the in-memory form of one configuration file: a JSON
//! object from string keys to arbitrary values. This crate never loads or
//! stores documents itself; it only inspects and mutates maps handed to it
//! by the caller.

use serde_json::{Map, Value};

/// An in-memory configuration document.
///
/// References to a `Document` are always non-null, so the checks in this
/// crate never have a "nil document" failure mode.
pub type Document = Map<String, Value>;

/// Error reading a typed field out of a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The key is not present in the document.
    #[error("field '{key}' is missing")]
    Missing {
        /// The absent key.
        key: String,
    },
    /// The key is present but holds a value of a different type.
    #[error("expected field '{key}' to be a {expected}, got {found}")]
    WrongType {
        /// The offending key.
        key: String,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type actually stored.
        found: &'static str,
    },
}

/// Human-readable type name of a JSON value, for error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a string field from a document.
pub fn get_str<'a>(doc: &'a Document, key: &str) -> Result<&'a str, FieldError> {
    let value = doc.get(key).ok_or_else(|| FieldError::Missing {
        key: key.to_string(),
    })?;
    value.as_str().ok_or_else(|| FieldError::WrongType {
        key: key.to_string(),
        expected: "string",
        found: value_type_name(value),
    })
}

/// Read a boolean field from a document.
pub fn get_bool(doc: &Document, key: &str) -> Result<bool, FieldError> {
    let value = doc.get(key).ok_or_else(|| FieldError::Missing {
        key: key.to_string(),
    })?;
    value.as_bool().ok_or_else(|| FieldError::WrongType {
        key: key.to_string(),
        expected: "boolean",
        found: value_type_name(value),
    })
}
