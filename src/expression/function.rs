//! Function definition and application

use std::fmt;
use std::sync::Arc;

use super::{Expression, ExpressionNode};

type Body<A, B> = Arc<dyn Fn(Expression<A>) -> Expression<B> + Send + Sync>;

/// A single-argument function from `A` to `B`
///
/// The body is a builder: it receives an expression standing for the argument
/// and returns the result expression. Each application compiles to its own
/// `FunctionDef` node with a fresh binding, even when one `Function` is applied
/// several times in the same tree.
pub struct Function<A, B> {
    body: Body<A, B>,
}

impl<A, B> Clone for Function<A, B> {
    fn clone(&self) -> Self {
        Self {
            body: Arc::clone(&self.body),
        }
    }
}

impl<A, B> fmt::Debug for Function<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").finish_non_exhaustive()
    }
}

impl<A: 'static, B: 'static> Function<A, B> {
    /// Define a function from its body builder
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(Expression<A>) -> Expression<B> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
        }
    }

    /// Apply the function: bind `input` to a fresh name and evaluate the body
    ///
    /// The subject is left untouched; only the argument is bound.
    pub fn apply(&self, input: Expression<A>) -> Expression<B> {
        let body = Arc::clone(&self.body);
        Expression::from_node(ExpressionNode::FunctionDef {
            input: input.node,
            body: Arc::new(move |binding| body(Expression::lookup(binding)).node),
        })
    }

    /// Compose with another function, applying `self` first
    pub fn and_then<C: 'static>(self, next: Function<B, C>) -> Function<A, C> {
        Function::new(move |argument| next.apply(self.apply(argument)))
    }
}

impl<A: 'static> Expression<A> {
    /// Bind `input` and build the body from the bound argument
    pub fn let_in<B: 'static, F>(input: Expression<A>, body: F) -> Expression<B>
    where
        F: Fn(Expression<A>) -> Expression<B> + Send + Sync + 'static,
    {
        Function::new(body).apply(input)
    }

    /// Apply `function` to this expression
    pub fn apply<B: 'static>(self, function: &Function<A, B>) -> Expression<B> {
        function.apply(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_builds_function_def() {
        let double = Function::new(|x: Expression<i64>| x.clone().pipe(x));
        let expr = double.apply(Expression::integer(2));
        match expr.node.as_ref() {
            ExpressionNode::FunctionDef { input, body } => {
                assert!(matches!(input.as_ref(), ExpressionNode::Literal(..)));
                let instantiated = body(crate::ir::Binding::from_raw(9));
                assert_eq!(format!("{instantiated:?}"), "Pipe(Lookup($9), Lookup($9))");
            }
            other => panic!("expected FunctionDef, got {other:?}"),
        }
    }

    #[test]
    fn test_and_then_nests_applications() {
        use crate::capability::Numeric;

        let inc = Function::new(|x: Expression<i64>| x.add(Expression::integer(1), Numeric::integer()));
        let twice = inc.clone().and_then(inc);
        let program = Expression::integer(40).apply(&twice).compile();

        assert_eq!(program.validate(), Ok(()));
        let result = crate::evaluator::Evaluator::new().evaluate(
            &program,
            &crate::evaluator::EvaluationContext::new(),
            &crate::model::RuntimeValue::Unit,
        );
        assert_eq!(result, Ok(crate::model::RuntimeValue::Integer(42)));
    }
}
