use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Identifier of a stored object.
///
/// Stores key objects by arbitrary JSON: a number, a string, or a composite
/// list such as `["osm", "123"]`. The id is never interpreted here; an edit
/// carries it through to the store exactly as it appeared on the original.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Value);

impl ObjectId {
    /// Wrap an id value taken from an object's `id` field.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Build a composite id from its parts.
    pub fn composite<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Value::Array(
            parts.into_iter().map(|p| Value::String(p.into())).collect(),
        ))
    }

    /// Read the `id` field of an object, if it has one.
    pub fn of(object: &Value) -> Option<Self> {
        match object {
            Value::Object(map) => map.get("id").cloned().map(Self),
            _ => None,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ObjectId {
    fn from(n: i64) -> Self {
        Self(Value::from(n))
    }
}

impl From<i32> for ObjectId {
    fn from(n: i32) -> Self {
        Self(Value::from(n))
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(Value::from(s))
    }
}

impl From<Value> for ObjectId {
    fn from(v: Value) -> Self {
        Self(v)
    }
}
