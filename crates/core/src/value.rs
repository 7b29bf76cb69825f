//! Tagged external value representation.
//!
//! Untyped wire input is decided into a `Value` once at the API boundary, so
//! the field engine pattern-matches on an explicit tag instead of inspecting
//! runtime type metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CodebaseContent, MarkupContent, Time};

/// A dynamically typed field value.
///
/// Scalar variants compare by value; `Float` follows IEEE-754 equality.
/// Different variants are never equal, even when numerically close:
/// `Int(1) != Float(1.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value
    Null,
    /// UTF-8 string
    String(String),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Point in time
    Instant(Time),
    /// UUID reference
    Uuid(Uuid),
    /// Sequence of values
    List(Vec<Value>),
    /// String-keyed mapping
    Map(BTreeMap<String, Value>),
    /// Structured rich text
    Markup(MarkupContent),
    /// Structured codebase metadata
    Codebase(CodebaseContent),
}

impl Value {
    /// The tag name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Instant(_) => "instant",
            Value::Uuid(_) => "uuid",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Markup(_) => "markup",
            Value::Codebase(_) => "codebase",
        }
    }

    /// Whether this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
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

impl From<Time> for Value {
    fn from(v: Time) -> Self {
        Value::Instant(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<MarkupContent> for Value {
    fn from(v: MarkupContent) -> Self {
        Value::Markup(v)
    }
}

impl From<CodebaseContent> for Value {
    fn from(v: CodebaseContent) -> Self {
        Value::Codebase(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_never_cross_compare() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::String("1".to_string()), Value::Int(1));
    }

    #[test]
    fn float_follows_ieee754() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
    }
}
