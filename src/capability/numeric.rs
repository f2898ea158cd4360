//! Numeric capability: arithmetic and ordering over erased operands

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

use crate::model::RuntimeValue;

/// Erased numeric tag stored inside math nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// 64-bit signed integers with checked arithmetic
    Integer,
    /// Arbitrary precision decimals; integer operands are widened
    Decimal,
}

/// Typed numeric tag handed to math combinators
pub struct Numeric<T> {
    kind: NumericKind,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Numeric<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Numeric<T> {}

impl<T> fmt::Debug for Numeric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Numeric").field(&self.kind).finish()
    }
}

impl<T> Numeric<T> {
    const fn of(kind: NumericKind) -> Self {
        Self {
            kind,
            _marker: PhantomData,
        }
    }

    /// The erased kind carried into the IR
    pub fn kind(&self) -> NumericKind {
        self.kind
    }
}

impl Numeric<i64> {
    /// Integer arithmetic
    pub const fn integer() -> Self {
        Self::of(NumericKind::Integer)
    }
}

impl Numeric<Decimal> {
    /// Decimal arithmetic
    pub const fn decimal() -> Self {
        Self::of(NumericKind::Decimal)
    }
}

/// Failure of an arithmetic operation on well-typed operands
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticFault {
    /// Divisor of a division or modulo was zero
    #[error("division by zero")]
    DivisionByZero,
    /// Result does not fit the numeric representation
    #[error("numeric overflow")]
    Overflow,
}

/// A runtime value read through a numeric tag
///
/// Both operands of a binary operation are read by the same tag, so they always
/// share a variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integer operand
    Integer(i64),
    /// Decimal operand
    Decimal(Decimal),
}

impl From<Number> for RuntimeValue {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(i) => RuntimeValue::Integer(i),
            Number::Decimal(d) => RuntimeValue::Decimal(d),
        }
    }
}

type FaultResult = Result<Number, ArithmeticFault>;

impl NumericKind {
    /// Stable lowercase name, shared with the canonical encoding
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
        }
    }

    /// Inverse of [`NumericKind::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "integer" => Some(Self::Integer),
            "decimal" => Some(Self::Decimal),
            _ => None,
        }
    }

    /// Read a runtime value as an operand of this kind
    pub fn read(self, value: &RuntimeValue) -> Option<Number> {
        match (self, value) {
            (Self::Integer, RuntimeValue::Integer(i)) => Some(Number::Integer(*i)),
            (Self::Decimal, RuntimeValue::Integer(i)) => Some(Number::Decimal(Decimal::from(*i))),
            (Self::Decimal, RuntimeValue::Decimal(d)) => Some(Number::Decimal(*d)),
            _ => None,
        }
    }

    /// Checked addition
    pub fn add(self, left: Number, right: Number) -> FaultResult {
        match (left, right) {
            (Number::Integer(l), Number::Integer(r)) => {
                l.checked_add(r).map(Number::Integer).ok_or(ArithmeticFault::Overflow)
            }
            (l, r) => {
                let (l, r) = as_decimals(l, r);
                l.checked_add(r).map(Number::Decimal).ok_or(ArithmeticFault::Overflow)
            }
        }
    }

    /// Checked multiplication
    pub fn multiply(self, left: Number, right: Number) -> FaultResult {
        match (left, right) {
            (Number::Integer(l), Number::Integer(r)) => {
                l.checked_mul(r).map(Number::Integer).ok_or(ArithmeticFault::Overflow)
            }
            (l, r) => {
                let (l, r) = as_decimals(l, r);
                l.checked_mul(r).map(Number::Decimal).ok_or(ArithmeticFault::Overflow)
            }
        }
    }

    /// Checked division; integers truncate toward zero
    ///
    /// Decimal quotients are rounded to `scale` fractional digits when given.
    pub fn divide(self, left: Number, right: Number, scale: Option<u32>) -> FaultResult {
        if is_zero(right) {
            return Err(ArithmeticFault::DivisionByZero);
        }
        match (left, right) {
            (Number::Integer(l), Number::Integer(r)) => {
                l.checked_div(r).map(Number::Integer).ok_or(ArithmeticFault::Overflow)
            }
            (l, r) => {
                let (l, r) = as_decimals(l, r);
                let quotient = l.checked_div(r).ok_or(ArithmeticFault::Overflow)?;
                Ok(Number::Decimal(match scale {
                    Some(dp) => quotient.round_dp(dp),
                    None => quotient,
                }))
            }
        }
    }

    /// Checked remainder with the sign of the dividend
    pub fn modulo(self, left: Number, right: Number) -> FaultResult {
        if is_zero(right) {
            return Err(ArithmeticFault::DivisionByZero);
        }
        match (left, right) {
            (Number::Integer(l), Number::Integer(r)) => {
                l.checked_rem(r).map(Number::Integer).ok_or(ArithmeticFault::Overflow)
            }
            (l, r) => {
                let (l, r) = as_decimals(l, r);
                l.checked_rem(r).map(Number::Decimal).ok_or(ArithmeticFault::Overflow)
            }
        }
    }

    /// Checked negation
    pub fn negate(self, operand: Number) -> FaultResult {
        match operand {
            Number::Integer(i) => i.checked_neg().map(Number::Integer).ok_or(ArithmeticFault::Overflow),
            Number::Decimal(d) => Ok(Number::Decimal(-d)),
        }
    }

    /// Total order of two operands of this kind
    pub fn compare(self, left: Number, right: Number) -> Ordering {
        match (left, right) {
            (Number::Integer(l), Number::Integer(r)) => l.cmp(&r),
            (l, r) => {
                let (l, r) = as_decimals(l, r);
                l.cmp(&r)
            }
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn as_decimal(number: Number) -> Decimal {
    match number {
        Number::Integer(i) => Decimal::from(i),
        Number::Decimal(d) => d,
    }
}

fn as_decimals(left: Number, right: Number) -> (Decimal, Decimal) {
    (as_decimal(left), as_decimal(right))
}

fn is_zero(number: Number) -> bool {
    match number {
        Number::Integer(i) => i == 0,
        Number::Decimal(d) => d.is_zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Number {
        Number::Integer(i)
    }

    fn dec(mantissa: i64, scale: u32) -> Number {
        Number::Decimal(Decimal::new(mantissa, scale))
    }

    #[test]
    fn test_integer_tag_rejects_decimals() {
        let tag = NumericKind::Integer;
        assert_eq!(tag.read(&RuntimeValue::Integer(3)), Some(int(3)));
        assert_eq!(tag.read(&RuntimeValue::Decimal(Decimal::ONE)), None);
        assert_eq!(tag.read(&RuntimeValue::from("3")), None);
    }

    #[test]
    fn test_decimal_tag_widens_integers() {
        let tag = NumericKind::Decimal;
        assert_eq!(tag.read(&RuntimeValue::Integer(2)), Some(Number::Decimal(Decimal::from(2))));
    }

    #[test]
    fn test_integer_overflow_is_reported() {
        let tag = NumericKind::Integer;
        assert_eq!(tag.add(int(i64::MAX), int(1)), Err(ArithmeticFault::Overflow));
        assert_eq!(tag.negate(int(i64::MIN)), Err(ArithmeticFault::Overflow));
        assert_eq!(tag.divide(int(i64::MIN), int(-1), None), Err(ArithmeticFault::Overflow));
    }

    #[test]
    fn test_division_by_zero() {
        for tag in [NumericKind::Integer, NumericKind::Decimal] {
            let zero = match tag {
                NumericKind::Integer => int(0),
                NumericKind::Decimal => dec(0, 0),
            };
            assert_eq!(tag.divide(int(1), zero, None), Err(ArithmeticFault::DivisionByZero));
            assert_eq!(tag.modulo(int(1), zero), Err(ArithmeticFault::DivisionByZero));
        }
    }

    #[test]
    fn test_integer_division_truncates() {
        let tag = NumericKind::Integer;
        assert_eq!(tag.divide(int(7), int(2), None), Ok(int(3)));
        assert_eq!(tag.divide(int(-7), int(2), None), Ok(int(-3)));
        assert_eq!(tag.modulo(int(-7), int(2)), Ok(int(-1)));
    }

    #[test]
    fn test_decimal_division_scale() {
        let tag = NumericKind::Decimal;
        let third = tag.divide(dec(1, 0), dec(3, 0), Some(4)).unwrap();
        assert_eq!(third, dec(3333, 4));
    }

    #[test]
    fn test_compare_mixed_precision() {
        let tag = NumericKind::Decimal;
        assert_eq!(tag.compare(dec(10, 1), dec(100, 2)), Ordering::Equal);
        assert_eq!(tag.compare(dec(15, 1), dec(1, 0)), Ordering::Greater);
    }

    #[test]
    fn test_name_round_trip() {
        for tag in [NumericKind::Integer, NumericKind::Decimal] {
            assert_eq!(NumericKind::from_name(tag.name()), Some(tag));
        }
        assert_eq!(NumericKind::from_name("float"), None);
    }
}
