//! Constructor capability: reconstruction of embedded literals

use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::model::RuntimeValue;

/// Erased constructor tag stored inside literal nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructorKind {
    /// Unit
    Unit,
    /// Boolean
    Boolean,
    /// Integer
    Integer,
    /// Decimal; integer payloads are widened on reconstruction
    Decimal,
    /// String
    String,
    /// Sequence of any length
    Sequence,
    /// Two-element sequence
    Pair,
    /// Record
    Record,
    /// Any runtime value, no shape check
    Any,
}

/// Typed constructor tag handed to `Expression::literal`
pub struct Constructor<T> {
    kind: ConstructorKind,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Constructor<T> {}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constructor").field(&self.kind).finish()
    }
}

impl<T> Constructor<T> {
    const fn of(kind: ConstructorKind) -> Self {
        Self {
            kind,
            _marker: PhantomData,
        }
    }

    /// The erased kind carried into the IR
    pub fn kind(&self) -> ConstructorKind {
        self.kind
    }
}

impl Constructor<()> {
    /// Unit literals
    pub const fn unit() -> Self {
        Self::of(ConstructorKind::Unit)
    }
}

impl Constructor<bool> {
    /// Boolean literals
    pub const fn boolean() -> Self {
        Self::of(ConstructorKind::Boolean)
    }
}

impl Constructor<i64> {
    /// Integer literals
    pub const fn integer() -> Self {
        Self::of(ConstructorKind::Integer)
    }
}

impl Constructor<Decimal> {
    /// Decimal literals
    pub const fn decimal() -> Self {
        Self::of(ConstructorKind::Decimal)
    }
}

impl Constructor<String> {
    /// String literals
    pub const fn string() -> Self {
        Self::of(ConstructorKind::String)
    }
}

impl<T> Constructor<Vec<T>> {
    /// Sequence literals
    pub const fn sequence() -> Self {
        Self::of(ConstructorKind::Sequence)
    }
}

impl<A, B> Constructor<(A, B)> {
    /// Pair literals
    pub const fn pair() -> Self {
        Self::of(ConstructorKind::Pair)
    }
}

impl Constructor<IndexMap<String, RuntimeValue>> {
    /// Record literals
    pub const fn record() -> Self {
        Self::of(ConstructorKind::Record)
    }
}

impl Constructor<RuntimeValue> {
    /// Untyped literals
    pub const fn any() -> Self {
        Self::of(ConstructorKind::Any)
    }
}

impl ConstructorKind {
    /// Stable lowercase name, shared with the canonical encoding
    pub fn name(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Pair => "pair",
            Self::Record => "record",
            Self::Any => "any",
        }
    }

    /// Inverse of [`ConstructorKind::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "unit" => Some(Self::Unit),
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "decimal" => Some(Self::Decimal),
            "string" => Some(Self::String),
            "sequence" => Some(Self::Sequence),
            "pair" => Some(Self::Pair),
            "record" => Some(Self::Record),
            "any" => Some(Self::Any),
            _ => None,
        }
    }

    /// Rebuild a literal payload in the representation this tag expects
    ///
    /// Returns `None` when the payload has the wrong shape.
    pub fn reconstruct<'v>(self, value: &'v RuntimeValue) -> Option<Cow<'v, RuntimeValue>> {
        use RuntimeValue as V;

        match (self, value) {
            (Self::Any, v)
            | (Self::Unit, v @ V::Unit)
            | (Self::Boolean, v @ V::Boolean(_))
            | (Self::Integer, v @ V::Integer(_))
            | (Self::Decimal, v @ V::Decimal(_))
            | (Self::String, v @ V::String(_))
            | (Self::Sequence, v @ V::Sequence(_))
            | (Self::Record, v @ V::Record(_)) => Some(Cow::Borrowed(v)),
            (Self::Pair, V::Sequence(items)) if items.len() == 2 => Some(Cow::Borrowed(value)),
            (Self::Decimal, V::Integer(i)) => Some(Cow::Owned(V::Decimal(Decimal::from(*i)))),
            _ => None,
        }
    }
}

impl fmt::Display for ConstructorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_matching_shape() {
        let value = RuntimeValue::Integer(5);
        assert_eq!(
            ConstructorKind::Integer.reconstruct(&value),
            Some(Cow::Borrowed(&value))
        );
        assert!(ConstructorKind::Any.reconstruct(&RuntimeValue::Unit).is_some());
    }

    #[test]
    fn test_reconstruct_widens_integer_to_decimal() {
        let rebuilt = ConstructorKind::Decimal.reconstruct(&RuntimeValue::Integer(2));
        assert_eq!(
            rebuilt.map(Cow::into_owned),
            Some(RuntimeValue::Decimal(Decimal::from(2)))
        );
    }

    #[test]
    fn test_reconstruct_rejects_wrong_shape() {
        assert!(ConstructorKind::Integer.reconstruct(&RuntimeValue::from("1")).is_none());
        assert!(ConstructorKind::Pair.reconstruct(&RuntimeValue::from(vec![1i64])).is_none());
        assert!(
            ConstructorKind::Pair
                .reconstruct(&RuntimeValue::pair(1i64, 2i64))
                .is_some()
        );
    }
}
