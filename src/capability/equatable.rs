//! Equality capability

use rust_decimal::Decimal;
use std::fmt;
use std::marker::PhantomData;

use super::numeric::NumericKind;
use crate::model::RuntimeValue;

/// Erased equality tag stored inside `EqualTo` nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquatableKind {
    /// Both operands must be unit
    Unit,
    /// Both operands must be booleans
    Boolean,
    /// Both operands must be integers
    Integer,
    /// Numeric equality; integers are widened, scale is ignored
    Decimal,
    /// Both operands must be strings
    String,
    /// Structural equality of arbitrary values
    Structural,
}

/// Typed equality tag handed to `equal_to`
pub struct Equatable<T> {
    kind: EquatableKind,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Equatable<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Equatable<T> {}

impl<T> fmt::Debug for Equatable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Equatable").field(&self.kind).finish()
    }
}

impl<T> Equatable<T> {
    const fn of(kind: EquatableKind) -> Self {
        Self {
            kind,
            _marker: PhantomData,
        }
    }

    /// Structural equality, available for every value type
    pub const fn structural() -> Self {
        Self::of(EquatableKind::Structural)
    }

    /// The erased kind carried into the IR
    pub fn kind(&self) -> EquatableKind {
        self.kind
    }
}

impl Equatable<()> {
    /// Unit equality
    pub const fn unit() -> Self {
        Self::of(EquatableKind::Unit)
    }
}

impl Equatable<bool> {
    /// Boolean equality
    pub const fn boolean() -> Self {
        Self::of(EquatableKind::Boolean)
    }
}

impl Equatable<i64> {
    /// Integer equality
    pub const fn integer() -> Self {
        Self::of(EquatableKind::Integer)
    }
}

impl Equatable<Decimal> {
    /// Numeric decimal equality
    pub const fn decimal() -> Self {
        Self::of(EquatableKind::Decimal)
    }
}

impl Equatable<String> {
    /// String equality
    pub const fn string() -> Self {
        Self::of(EquatableKind::String)
    }
}

impl EquatableKind {
    /// Stable lowercase name, shared with the canonical encoding
    pub fn name(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Structural => "structural",
        }
    }

    /// Inverse of [`EquatableKind::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "unit" => Some(Self::Unit),
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "decimal" => Some(Self::Decimal),
            "string" => Some(Self::String),
            "structural" => Some(Self::Structural),
            _ => None,
        }
    }

    /// Compare two values under this tag
    ///
    /// Returns `None` when an operand lies outside the tag's domain.
    pub fn equals(self, left: &RuntimeValue, right: &RuntimeValue) -> Option<bool> {
        use RuntimeValue as V;

        match (self, left, right) {
            (Self::Structural, l, r) => Some(l == r),
            (Self::Unit, V::Unit, V::Unit) => Some(true),
            (Self::Boolean, V::Boolean(l), V::Boolean(r)) => Some(l == r),
            (Self::Integer, V::Integer(l), V::Integer(r)) => Some(l == r),
            (Self::String, V::String(l), V::String(r)) => Some(l == r),
            (Self::Decimal, l, r) => {
                let l = NumericKind::Decimal.read(l)?;
                let r = NumericKind::Decimal.read(r)?;
                Some(NumericKind::Decimal.compare(l, r).is_eq())
            }
            _ => None,
        }
    }
}

impl fmt::Display for EquatableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
