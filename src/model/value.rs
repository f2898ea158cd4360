//! Core value type for expression evaluation

use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use super::error::{ModelError, Result};

/// Field map of a record value
///
/// Equality ignores insertion order, field names are unique.
pub type Record = IndexMap<String, RuntimeValue>;

/// Universal dynamic value
///
/// This enum represents every value an evaluation can produce and every payload
/// a literal node can embed. Two values are equal iff they are the same variant
/// with recursively equal contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuntimeValue {
    /// The unit value (JSON `null`)
    #[default]
    Unit,

    /// Boolean value
    Boolean(bool),

    /// Integer value (64-bit signed)
    Integer(i64),

    /// Decimal value with arbitrary precision
    Decimal(Decimal),

    /// String value
    String(String),

    /// Ordered sequence of values, also used for tuples
    Sequence(Vec<RuntimeValue>),

    /// Record of named fields
    Record(Record),
}

/// Discriminant of a [`RuntimeValue`], used in diagnostics and tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`RuntimeValue::Unit`]
    Unit,
    /// [`RuntimeValue::Boolean`]
    Boolean,
    /// [`RuntimeValue::Integer`]
    Integer,
    /// [`RuntimeValue::Decimal`]
    Decimal,
    /// [`RuntimeValue::String`]
    String,
    /// [`RuntimeValue::Sequence`]
    Sequence,
    /// [`RuntimeValue::Record`]
    Record,
}

impl ValueKind {
    /// Stable lowercase name, shared with the canonical encoding
    pub fn name(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Record => "record",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl RuntimeValue {
    /// Build a two-element tuple
    pub fn pair(first: impl Into<RuntimeValue>, second: impl Into<RuntimeValue>) -> Self {
        Self::Sequence(vec![first.into(), second.into()])
    }

    /// Build a record from `(name, value)` pairs; later duplicates win
    pub fn record<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<RuntimeValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The variant of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Unit => ValueKind::Unit,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::String(_) => ValueKind::String,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Record(_) => ValueKind::Record,
        }
    }

    /// Get the boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of elements of a composite value, `None` for primitives
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Sequence(items) => Some(items.len()),
            Self::Record(fields) => Some(fields.len()),
            _ => None,
        }
    }

    /// Positional access into a sequence or a record (in insertion order)
    pub fn get_index(&self, index: usize) -> Option<&RuntimeValue> {
        match self {
            Self::Sequence(items) => items.get(index),
            Self::Record(fields) => fields.get_index(index).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Walk a path of record keys and sequence indices
    ///
    /// Returns `None` as soon as a segment cannot be resolved.
    pub fn path<T: AsRef<str>>(&self, path: &[T]) -> Option<&RuntimeValue> {
        let mut value = self;
        for segment in path {
            value = match value {
                Self::Record(fields) => fields.get(segment.as_ref())?,
                Self::Sequence(items) => items.get(segment.as_ref().parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }

    /// Convert a JSON document into a runtime value
    ///
    /// Integral numbers become [`RuntimeValue::Integer`], every other number
    /// becomes a [`RuntimeValue::Decimal`].
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        Ok(match json {
            JsonValue::Null => Self::Unit,
            JsonValue::Bool(b) => Self::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else {
                    Self::Decimal(json_number_to_decimal(n)?)
                }
            }
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Array(items) => Self::Sequence(
                items
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            JsonValue::Object(map) => Self::Record(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), Self::from_json(v)?)))
                    .collect::<Result<Record>>()?,
            ),
        })
    }

    /// Convert into the JSON wire representation
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Unit => JsonValue::Null,
            Self::Boolean(b) => JsonValue::Bool(*b),
            Self::Integer(i) => JsonValue::from(*i),
            Self::Decimal(d) => d
                .normalize()
                .to_string()
                .parse::<serde_json::Number>()
                .map(JsonValue::Number)
                .unwrap_or_else(|_| JsonValue::String(d.to_string())),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Sequence(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Record(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn json_number_to_decimal(n: &serde_json::Number) -> Result<Decimal> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .or_else(|| n.as_u64().and_then(Decimal::from_u64))
        .ok_or(ModelError::NumberOutOfRange { value: text })
}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "()"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<()> for RuntimeValue {
    fn from(_: ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for RuntimeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for RuntimeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for RuntimeValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<Decimal> for RuntimeValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<String> for RuntimeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for RuntimeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<T: Into<RuntimeValue>> From<Vec<T>> for RuntimeValue {
    fn from(values: Vec<T>) -> Self {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<RuntimeValue>, B: Into<RuntimeValue>> From<(A, B)> for RuntimeValue {
    fn from((a, b): (A, B)) -> Self {
        Self::pair(a, b)
    }
}

impl From<Record> for RuntimeValue {
    fn from(fields: Record) -> Self {
        Self::Record(fields)
    }
}

impl TryFrom<&JsonValue> for RuntimeValue {
    type Error = ModelError;

    fn try_from(json: &JsonValue) -> Result<Self> {
        Self::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_equality_ignores_order() {
        let a = RuntimeValue::record([("id", 1), ("rank", 2)]);
        let b = RuntimeValue::record([("rank", 2), ("id", 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_variants_are_not_interchangeable() {
        assert_ne!(RuntimeValue::Integer(1), RuntimeValue::Decimal(Decimal::ONE));
        assert_ne!(RuntimeValue::Unit, RuntimeValue::Sequence(vec![]));
    }

    #[test]
    fn test_from_json() {
        let value = RuntimeValue::from_json(&json!({
            "id": 7,
            "score": 1.5,
            "tags": ["a", null],
            "active": true
        }))
        .unwrap();

        assert_eq!(value.path(&["id"]), Some(&RuntimeValue::Integer(7)));
        assert_eq!(
            value.path(&["score"]),
            Some(&RuntimeValue::Decimal(Decimal::new(15, 1)))
        );
        assert_eq!(value.path(&["tags", "1"]), Some(&RuntimeValue::Unit));
        assert_eq!(value.path(&["active"]).and_then(RuntimeValue::as_bool), Some(true));
    }

    #[test]
    fn test_path_not_found() {
        let value = RuntimeValue::from_json(&json!({"a": {"b": "c"}})).unwrap();
        assert!(value.path(&["a", "b", "c"]).is_none());
        assert!(value.path(&["a", "x"]).is_none());
    }

    #[test]
    fn test_to_json() {
        let value = RuntimeValue::record([
            ("n", RuntimeValue::Decimal(Decimal::new(250, 2))),
            ("items", RuntimeValue::from(vec![1i64, 2])),
        ]);
        assert_eq!(value.to_json(), json!({"n": 2.5, "items": [1, 2]}));
    }

    #[test]
    fn test_get_index_on_record_follows_insertion_order() {
        let value = RuntimeValue::record([("b", 2), ("a", 1)]);
        assert_eq!(value.get_index(0), Some(&RuntimeValue::Integer(2)));
        assert_eq!(value.get_index(2), None);
        assert_eq!(RuntimeValue::Integer(3).get_index(0), None);
    }

    #[test]
    fn test_display() {
        let value = RuntimeValue::pair("x", vec![true]);
        assert_eq!(value.to_string(), "[\"x\", [true]]");
    }
}
