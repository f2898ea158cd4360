//! Arithmetic, ordering and equality combinators
//!
//! Every combinator takes the capability tag for `T` explicitly; the tag is
//! stored in the compiled node and drives the evaluator's arithmetic.

use super::{Expression, ExpressionNode};
use crate::capability::{Equatable, Numeric};
use crate::ir::{BinaryMathOp, UnaryMathOp};

impl<T> Expression<T> {
    fn math(self, op: BinaryMathOp, other: Expression<T>, tag: Numeric<T>) -> Self {
        Self::from_node(ExpressionNode::MathBinary(op, self.node, other.node, tag.kind()))
    }

    fn ordering(self, op: BinaryMathOp, other: Expression<T>, tag: Numeric<T>) -> Expression<bool> {
        Expression::from_node(ExpressionNode::MathBinary(op, self.node, other.node, tag.kind()))
    }

    /// `self + other`
    pub fn add(self, other: Expression<T>, tag: Numeric<T>) -> Self {
        self.math(BinaryMathOp::Add, other, tag)
    }

    /// `self * other`
    pub fn multiply(self, other: Expression<T>, tag: Numeric<T>) -> Self {
        self.math(BinaryMathOp::Multiply, other, tag)
    }

    /// `self / other`; fails at evaluation time when `other` is zero
    pub fn divide(self, other: Expression<T>, tag: Numeric<T>) -> Self {
        self.math(BinaryMathOp::Divide, other, tag)
    }

    /// `self % other`; fails at evaluation time when `other` is zero
    pub fn modulo(self, other: Expression<T>, tag: Numeric<T>) -> Self {
        self.math(BinaryMathOp::Modulo, other, tag)
    }

    /// `-self`
    pub fn negate(self, tag: Numeric<T>) -> Self {
        Self::from_node(ExpressionNode::MathUnary(UnaryMathOp::Negate, self.node, tag.kind()))
    }

    /// `self > other`
    pub fn greater_than(self, other: Expression<T>, tag: Numeric<T>) -> Expression<bool> {
        self.ordering(BinaryMathOp::GreaterThan, other, tag)
    }

    /// `self >= other`
    pub fn greater_than_equal(self, other: Expression<T>, tag: Numeric<T>) -> Expression<bool> {
        self.ordering(BinaryMathOp::GreaterThanEqual, other, tag)
    }

    /// Equality under the tag's rule
    pub fn equal_to(self, other: Expression<T>, tag: Equatable<T>) -> Expression<bool> {
        Expression::from_node(ExpressionNode::EqualTo(self.node, other.node, tag.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_tag_is_recorded() {
        let expr = Expression::decimal(Decimal::ONE).add(Expression::decimal(Decimal::TWO), Numeric::decimal());
        assert!(matches!(
            expr.node.as_ref(),
            ExpressionNode::MathBinary(BinaryMathOp::Add, _, _, crate::capability::NumericKind::Decimal)
        ));
    }

    #[test]
    fn test_comparison_yields_boolean_expression() {
        let expr: Expression<bool> =
            Expression::integer(3).greater_than(Expression::integer(2), Numeric::integer());
        assert_eq!(
            format!("{expr:?}"),
            "Math(GreaterThan, Literal(3: integer), Literal(2: integer), Integer)"
        );
    }

    #[test]
    fn test_equal_to() {
        let expr = Expression::string("a").equal_to(Expression::string("b"), Equatable::string());
        assert!(matches!(expr.node.as_ref(), ExpressionNode::EqualTo(..)));
    }
}
