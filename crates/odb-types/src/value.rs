//! Dynamic value model for edited objects.
//!
//! A [`Value`] is anything an object in the store can hold: JSON scalars,
//! arrays, objects, plus dates. Objects use ordered maps so every walk over a
//! value visits keys in the same order.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use serde_json::Number;

use crate::error::TypeError;

/// Opaque reference to a callable found inside an object.
///
/// Functions are not data: the differ rejects them as whole inputs and skips
/// them as container entries, and serialization never emits them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionRef {
    name: String,
}

impl FunctionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Structural classification of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Null, boolean, number, string or date.
    Scalar,
    Array,
    Object,
    Function,
}

/// A JSON-compatible value, extended with dates and function markers.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Function(FunctionRef),
}

impl Value {
    /// Create a function marker with the given name.
    pub fn function(name: impl Into<String>) -> Self {
        Value::Function(FunctionRef::new(name))
    }

    /// Create a numeric value from a float. Fails for NaN and infinities.
    pub fn from_f64(f: f64) -> Result<Self, TypeError> {
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| TypeError::NonFiniteNumber(f.to_string()))
    }

    /// Classify this value structurally.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Date(_) => Shape::Scalar,
            Value::Array(_) => Shape::Array,
            Value::Object(_) => Shape::Object,
            Value::Function(_) => Shape::Function,
        }
    }

    /// Returns `true` for arrays and objects.
    pub fn is_container(&self) -> bool {
        matches!(self.shape(), Shape::Array | Shape::Object)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short lowercase name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a child by key. Arrays accept decimal index keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            Value::Array(items) => parse_index(key).and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Mutable counterpart of [`Value::get`].
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Object(map) => map.get_mut(key),
            Value::Array(items) => parse_index(key).and_then(move |i| items.get_mut(i)),
            _ => None,
        }
    }

    /// The children of a container keyed as the differ sees them: object
    /// keys verbatim, array positions as decimal strings. Scalars and
    /// functions have no entries.
    pub fn entries(&self) -> Vec<(String, &Value)> {
        match self {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Convert into a plain `serde_json::Value`. Dates become RFC 3339
    /// strings; functions nested in containers are dropped from objects and
    /// nulled in arrays.
    pub fn to_json(&self) -> Result<serde_json::Value, TypeError> {
        if let Value::Function(f) = self {
            return Err(TypeError::FunctionNotData(f.name.clone()));
        }
        serde_json::to_value(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

/// Parse a key made only of ASCII digits into an array index.
pub fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => {
                serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    if item.is_function() {
                        seq.serialize_element(&Value::Null)?;
                    } else {
                        seq.serialize_element(item)?;
                    }
                }
                seq.end()
            }
            Value::Object(map) => {
                let fields: Vec<_> = map.iter().filter(|(_, v)| !v.is_function()).collect();
                let mut out = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Function(f) => Err(S::Error::custom(TypeError::FunctionNotData(
                f.name.clone(),
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Function(func) => write!(f, "<function {}>", func.name),
            other => match serde_json::to_string(other) {
                Ok(s) => f.write_str(&s),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn object(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn shape_classifies_every_variant() {
        assert_eq!(Value::Null.shape(), Shape::Scalar);
        assert_eq!(Value::from("x").shape(), Shape::Scalar);
        assert_eq!(Value::Date(Utc::now()).shape(), Shape::Scalar);
        assert_eq!(Value::Array(vec![]).shape(), Shape::Array);
        assert_eq!(object(&[]).shape(), Shape::Object);
        assert_eq!(Value::function("f").shape(), Shape::Function);
    }

    #[test]
    fn integer_and_float_compare_numerically() {
        let int = Value::from(1);
        let float = Value::from_f64(1.0).unwrap();
        assert_eq!(int, float);
        assert_ne!(int, Value::from_f64(1.5).unwrap());
    }

    #[test]
    fn non_finite_float_rejected() {
        assert!(matches!(
            Value::from_f64(f64::NAN),
            Err(TypeError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn dates_compare_by_instant() {
        let a = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let b = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(Value::Date(a), Value::Date(b));
        assert_ne!(Value::Date(a), Value::from(a.to_rfc3339()));
    }

    #[test]
    fn null_is_not_equal_to_other_scalars() {
        assert_ne!(Value::Null, Value::from(false));
        assert_ne!(Value::Null, Value::from(""));
        assert_ne!(Value::Null, Value::from(0));
    }

    #[test]
    fn from_json_preserves_structure() {
        let v = Value::from(json!({"a": [1, "two", null], "b": {"c": true}}));
        assert_eq!(v.get("a").and_then(|a| a.get("1")), Some(&Value::from("two")));
        assert_eq!(v.get("b").and_then(|b| b.get("c")), Some(&Value::from(true)));
        assert!(v.get("missing").is_none());
    }

    #[test]
    fn array_get_requires_plain_digits() {
        let v = Value::from(json!(["a", "b"]));
        assert_eq!(v.get("1"), Some(&Value::from("b")));
        assert!(v.get("+1").is_none());
        assert!(v.get("").is_none());
        assert!(v.get("5").is_none());
    }

    #[test]
    fn entries_use_index_keys_for_arrays() {
        let v = Value::from(json!(["x", "y"]));
        let keys: Vec<String> = v.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["0", "1"]);
        assert!(Value::from(3).entries().is_empty());
    }

    #[test]
    fn serialization_skips_functions() {
        let v = object(&[
            ("name", Value::from("a")),
            ("callback", Value::function("onSave")),
            ("list", Value::Array(vec![Value::function("g"), Value::from(2)])),
        ]);
        let json = v.to_json().unwrap();
        assert_eq!(json, json!({"name": "a", "list": [null, 2]}));
    }

    #[test]
    fn top_level_function_is_not_data() {
        let err = Value::function("f").to_json().unwrap_err();
        assert_eq!(err, TypeError::FunctionNotData("f".into()));
    }

    #[test]
    fn dates_serialize_as_rfc3339() {
        let d = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_string(&Value::Date(d)).unwrap();
        assert_eq!(json, "\"2024-03-01T12:00:00.000Z\"");
    }

    #[test]
    fn serde_roundtrip() {
        let v = Value::from(json!({"id": 7, "tags": ["x"], "nested": {"k": 1.5}}));
        let text = serde_json::to_string(&v).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v, parsed);
    }

    #[test]
    fn display_is_compact_json() {
        assert_eq!(Value::from(json!({"a": [1]})).to_string(), r#"{"a":[1]}"#);
        assert_eq!(Value::function("f").to_string(), "<function f>");
    }
}
