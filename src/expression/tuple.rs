//! Tuple projections

use super::{Expression, ExpressionNode};
use crate::model::RuntimeValue;

impl<A, B> Expression<(A, B)> {
    /// First element of a pair
    pub fn first(self) -> Expression<A> {
        Expression::from_node(ExpressionNode::TupleGetIndex(self.node, 0))
    }

    /// Second element of a pair
    pub fn second(self) -> Expression<B> {
        Expression::from_node(ExpressionNode::TupleGetIndex(self.node, 1))
    }
}

impl<T> Expression<Vec<T>> {
    /// Element `index` of a sequence
    pub fn get(self, index: usize) -> Expression<T> {
        Expression::from_node(ExpressionNode::TupleGetIndex(self.node, index))
    }
}

impl<T> Expression<T> {
    /// Element `index` of any tuple-shaped value, untyped
    pub fn get_index(self, index: usize) -> Expression<RuntimeValue> {
        Expression::from_node(ExpressionNode::TupleGetIndex(self.node, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Constructor;

    #[test]
    fn test_pair_projections() {
        let pair = Expression::literal((1i64, "a".to_string()), Constructor::pair());
        let second: Expression<String> = pair.second();
        assert_eq!(
            format!("{second:?}"),
            "TupleGetIndex(Literal([1, \"a\"]: pair), 1)"
        );
    }
}
