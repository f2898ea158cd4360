//! Boolean combinators

use super::{Expression, ExpressionNode};
use crate::ir::BinaryLogicalOp;

impl Expression<bool> {
    /// Conjunction; `other` is only evaluated when `self` is true
    pub fn and(self, other: Expression<bool>) -> Expression<bool> {
        Self::from_node(ExpressionNode::LogicalBinary(
            BinaryLogicalOp::And,
            self.node,
            other.node,
        ))
    }

    /// Disjunction; `other` is only evaluated when `self` is false
    pub fn or(self, other: Expression<bool>) -> Expression<bool> {
        Self::from_node(ExpressionNode::LogicalBinary(
            BinaryLogicalOp::Or,
            self.node,
            other.node,
        ))
    }

    /// Negation
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expression<bool> {
        Self::from_node(ExpressionNode::Not(self.node))
    }

    /// Select `on_true` or `on_false` by the value of `self`
    ///
    /// Only the selected branch is ever evaluated.
    pub fn diverge<T>(self, on_true: Expression<T>, on_false: Expression<T>) -> Expression<T> {
        Expression::from_node(ExpressionNode::Diverge(self.node, on_true.node, on_false.node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diverge_node() {
        let expr = Expression::boolean(true).diverge(Expression::integer(1), Expression::integer(2));
        assert_eq!(
            format!("{expr:?}"),
            "Diverge(Literal(true: boolean), Literal(1: integer), Literal(2: integer))"
        );
    }

    #[test]
    fn test_and_or_not() {
        let expr = Expression::boolean(true)
            .and(Expression::boolean(false))
            .or(Expression::boolean(true).not());
        assert!(matches!(
            expr.node.as_ref(),
            ExpressionNode::LogicalBinary(BinaryLogicalOp::Or, _, _)
        ));
    }
}
