//! Dynamic values exchanged with the host application

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tagged-union value produced by reads and consumed by writes.
///
/// Scalars map to `Int`/`Float`/`Text`; an N-dimensional array maps to
/// `Seq`s nested to depth N with scalar leaves; structures map to a `Map`
/// of member name to value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Signed integer (bytes, shorts and longs widen to 64 bits)
    Int(i64),
    /// Floating point (floats widen to 64 bits)
    Float(f64),
    /// Character string
    Text(String),
    /// Ordered sequence, one nesting level per array dimension
    Seq(Vec<Value>),
    /// Structure members keyed by bare member name
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Kind name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Seq(_) => "seq",
            Value::Map(_) => "map",
        }
    }

    /// Integer contents, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric contents widened to `f64`, accepting both `Int` and `Float`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String contents, if this is a `Text`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Sequence contents, if this is a `Seq`
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(v) => Some(v),
            _ => None,
        }
    }

    /// Map contents, if this is a `Map`
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}
