//! Typed expression builder
//!
//! An [`Expression<T>`] describes a value of type `T` that has not been computed
//! yet. Combinators only build new expressions; nothing is evaluated until the
//! expression is compiled into a [`CompiledProgram`](crate::ir::CompiledProgram)
//! and handed to the [`Evaluator`](crate::evaluator::Evaluator).
//!
//! ```
//! use remote_expression::capability::Numeric;
//! use remote_expression::expression::Expression;
//! use remote_expression::model::RuntimeValue;
//! use remote_expression::{EvaluationContext, Evaluator};
//!
//! let answer = Expression::let_in(Expression::integer(41), |x| {
//!     x.add(Expression::integer(1), Numeric::integer())
//! });
//!
//! let program = answer.compile();
//! let result = Evaluator::new()
//!     .evaluate(&program, &EvaluationContext::new(), &RuntimeValue::Unit)
//!     .unwrap();
//! assert_eq!(result, RuntimeValue::Integer(42));
//! ```

#![warn(missing_docs)]

mod function;
mod logical;
mod math;
mod tuple;

pub use function::Function;

use rust_decimal::Decimal;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::capability::{
    Constructor, ConstructorKind, EquatableKind, NumericKind,
};
use crate::ir::{BinaryLogicalOp, BinaryMathOp, Binding, CompiledProgram, UnaryMathOp};
use crate::model::RuntimeValue;

/// Body of a function definition, instantiated once per compiled definition site
pub(crate) type BodyBuilder = Arc<dyn Fn(Binding) -> Arc<ExpressionNode> + Send + Sync>;

/// Untyped combinator tree behind [`Expression`]
pub(crate) enum ExpressionNode {
    Identity,
    Lookup(Binding),
    Literal(RuntimeValue, ConstructorKind),
    Immediate(Arc<ExpressionNode>),
    Defer(Arc<ExpressionNode>),
    FunctionDef {
        input: Arc<ExpressionNode>,
        body: BodyBuilder,
    },
    Pipe(Arc<ExpressionNode>, Arc<ExpressionNode>),
    EqualTo(Arc<ExpressionNode>, Arc<ExpressionNode>, EquatableKind),
    MathBinary(BinaryMathOp, Arc<ExpressionNode>, Arc<ExpressionNode>, NumericKind),
    MathUnary(UnaryMathOp, Arc<ExpressionNode>, NumericKind),
    LogicalBinary(BinaryLogicalOp, Arc<ExpressionNode>, Arc<ExpressionNode>),
    Not(Arc<ExpressionNode>),
    Diverge(Arc<ExpressionNode>, Arc<ExpressionNode>, Arc<ExpressionNode>),
    TupleGetIndex(Arc<ExpressionNode>, usize),
}

impl fmt::Debug for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "Identity"),
            Self::Lookup(b) => write!(f, "Lookup({b})"),
            Self::Literal(v, c) => write!(f, "Literal({v}: {c})"),
            Self::Immediate(inner) => f.debug_tuple("Immediate").field(inner).finish(),
            Self::Defer(inner) => f.debug_tuple("Defer").field(inner).finish(),
            Self::FunctionDef { input, .. } => f
                .debug_struct("FunctionDef")
                .field("input", input)
                .finish_non_exhaustive(),
            Self::Pipe(l, r) => f.debug_tuple("Pipe").field(l).field(r).finish(),
            Self::EqualTo(l, r, tag) => f.debug_tuple("EqualTo").field(l).field(r).field(tag).finish(),
            Self::MathBinary(op, l, r, tag) => f
                .debug_tuple("Math")
                .field(op)
                .field(l)
                .field(r)
                .field(tag)
                .finish(),
            Self::MathUnary(op, operand, tag) => {
                f.debug_tuple("Math").field(op).field(operand).field(tag).finish()
            }
            Self::LogicalBinary(op, l, r) => f.debug_tuple("Logical").field(op).field(l).field(r).finish(),
            Self::Not(operand) => f.debug_tuple("Not").field(operand).finish(),
            Self::Diverge(c, t, e) => f.debug_tuple("Diverge").field(c).field(t).field(e).finish(),
            Self::TupleGetIndex(tuple, index) => {
                f.debug_tuple("TupleGetIndex").field(tuple).field(index).finish()
            }
        }
    }
}

/// A not-yet-computed value of type `T`
pub struct Expression<T> {
    pub(crate) node: Arc<ExpressionNode>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for Expression<T> {
    fn clone(&self) -> Self {
        Self::from_node_ref(Arc::clone(&self.node))
    }
}

impl<T> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}

impl<T> Expression<T> {
    pub(crate) fn from_node(node: ExpressionNode) -> Self {
        Self::from_node_ref(Arc::new(node))
    }

    pub(crate) fn from_node_ref(node: Arc<ExpressionNode>) -> Self {
        Self {
            node,
            _type: PhantomData,
        }
    }

    /// The current subject, viewed as a `T`
    pub fn identity() -> Self {
        Self::from_node(ExpressionNode::Identity)
    }

    pub(crate) fn lookup(binding: Binding) -> Self {
        Self::from_node(ExpressionNode::Lookup(binding))
    }

    /// Embed a concrete value together with its constructor
    pub fn literal(value: T, constructor: Constructor<T>) -> Self
    where
        T: Into<RuntimeValue>,
    {
        Self::from_node(ExpressionNode::Literal(value.into(), constructor.kind()))
    }

    /// Sequence two expressions: `self`'s result becomes the subject of `next`
    pub fn pipe<U>(self, next: Expression<U>) -> Expression<U> {
        Expression::from_node(ExpressionNode::Pipe(self.node, next.node))
    }

    /// Evaluate eagerly, forcing a deferred result
    pub fn immediate(self) -> Self {
        Self::from_node(ExpressionNode::Immediate(self.node))
    }

    /// Delay evaluation until the value is demanded
    pub fn defer(self) -> Self {
        Self::from_node(ExpressionNode::Defer(self.node))
    }

    /// Reinterpret the static type of this expression
    ///
    /// Nothing is checked here; a mismatch surfaces when a capability tag reads
    /// the value at evaluation time.
    pub fn cast<U>(self) -> Expression<U> {
        Expression::from_node_ref(self.node)
    }

    /// Forget the static type
    pub fn dynamic(self) -> Expression<RuntimeValue> {
        self.cast()
    }

    /// Compile with a fresh compilation context
    pub fn compile(&self) -> CompiledProgram {
        crate::compiler::compile(self)
    }
}

impl Expression<()> {
    /// The unit literal
    pub fn unit() -> Self {
        Self::literal((), Constructor::unit())
    }
}

impl Expression<bool> {
    /// A boolean literal
    pub fn boolean(value: bool) -> Self {
        Self::literal(value, Constructor::boolean())
    }
}

impl Expression<i64> {
    /// An integer literal
    pub fn integer(value: i64) -> Self {
        Self::literal(value, Constructor::integer())
    }
}

impl Expression<Decimal> {
    /// A decimal literal
    pub fn decimal(value: Decimal) -> Self {
        Self::literal(value, Constructor::decimal())
    }
}

impl Expression<String> {
    /// A string literal
    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(value.into(), Constructor::string())
    }
}

impl Expression<RuntimeValue> {
    /// An untyped literal
    pub fn value(value: impl Into<RuntimeValue>) -> Self {
        Self::literal(value.into(), Constructor::any())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_node() {
        let expr = Expression::integer(5);
        assert!(matches!(
            expr.node.as_ref(),
            ExpressionNode::Literal(RuntimeValue::Integer(5), ConstructorKind::Integer)
        ));
    }

    #[test]
    fn test_clone_shares_node() {
        let expr = Expression::string("a");
        let copy = expr.clone();
        assert!(Arc::ptr_eq(&expr.node, &copy.node));
    }

    #[test]
    fn test_debug_output() {
        let expr = Expression::<i64>::identity().pipe(Expression::boolean(true));
        assert_eq!(format!("{expr:?}"), "Pipe(Identity, Literal(true: boolean))");
    }

    #[test]
    fn test_expressions_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Expression<i64>>();
    }
}
