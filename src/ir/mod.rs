//! Compiled program representation
//!
//! A [`CompiledProgram`] is an immutable, acyclic tree produced by compiling an
//! [`Expression`](crate::expression::Expression). It holds no closures: every
//! value needed at evaluation time is either embedded as a literal or resolved
//! through a [`Binding`] in the evaluation context, so programs can be compared,
//! encoded, digested and shared across threads.

#![warn(missing_docs)]

mod display;
mod validate;

pub use validate::IrError;

use std::fmt;
use std::sync::Arc;

use crate::capability::{ConstructorKind, EquatableKind, NumericKind};
use crate::model::RuntimeValue;

/// Shared handle to a sub-program
pub type ProgramRef = Arc<CompiledProgram>;

/// Identifier of one lexical slot introduced by a function definition
///
/// Bindings are allocated by the compiler; no two definition sites in one
/// compiled tree share a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Binding(u64);

impl Binding {
    /// Wrap a raw binding id
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw binding id
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Node of a compiled program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledProgram {
    /// The current subject
    Identity,

    /// Value bound to a binding by an enclosing function definition
    Lookup(Binding),

    /// Evaluate the inner program now, forcing a deferred result
    Immediate(ProgramRef),

    /// Delay the inner program until a consumer demands its value
    Defer(ProgramRef),

    /// Let-binding: evaluate `input`, bind it, evaluate `body` in the extended scope
    FunctionDef {
        /// Slot introduced for the body
        binding: Binding,
        /// Program evaluated with `binding` in scope
        body: ProgramRef,
        /// Program producing the bound value
        input: ProgramRef,
    },

    /// Embedded value with its reconstruction capability
    Literal {
        /// Payload returned as-is
        value: RuntimeValue,
        /// Shape the payload is reconstructed into when used as an operand
        constructor: ConstructorKind,
    },

    /// Sequential composition: the left result becomes the right subject
    Pipe {
        /// Producer
        left: ProgramRef,
        /// Consumer, evaluated with the producer's result as subject
        right: ProgramRef,
    },

    /// Equality under a capability tag
    EqualTo {
        /// Left operand
        left: ProgramRef,
        /// Right operand
        right: ProgramRef,
        /// Equality rule
        tag: EquatableKind,
    },

    /// Arithmetic or ordering under a capability tag
    Math {
        /// Operation and operands
        operation: MathOperation,
        /// Arithmetic rule
        tag: NumericKind,
    },

    /// Boolean logic and branching
    Logical(LogicalOperation),

    /// Positional projection out of a tuple-shaped value
    TupleGetIndex {
        /// Composite producer
        tuple: ProgramRef,
        /// Zero-based position
        index: usize,
    },
}

/// Arithmetic node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathOperation {
    /// Two-operand operation
    Binary {
        /// Operator
        op: BinaryMathOp,
        /// Left operand
        left: ProgramRef,
        /// Right operand
        right: ProgramRef,
    },
    /// Single-operand operation
    Unary {
        /// Operator
        op: UnaryMathOp,
        /// Operand
        operand: ProgramRef,
    },
}

/// Two-operand arithmetic and ordering operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryMathOp {
    /// `left + right`
    Add,
    /// `left * right`
    Multiply,
    /// `left / right`
    Divide,
    /// `left % right`
    Modulo,
    /// `left > right`
    GreaterThan,
    /// `left >= right`
    GreaterThanEqual,
}

/// Single-operand arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryMathOp {
    /// `-operand`
    Negate,
}

/// Logical node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalOperation {
    /// Short-circuiting two-operand operation
    Binary {
        /// Operator
        op: BinaryLogicalOp,
        /// Always evaluated
        left: ProgramRef,
        /// Evaluated only when `left` does not decide the result
        right: ProgramRef,
    },
    /// Operation on a single boolean operand
    Unary {
        /// Boolean operand
        operand: ProgramRef,
        /// Operator
        op: UnaryLogicalOp,
    },
}

/// Short-circuiting boolean operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryLogicalOp {
    /// Conjunction
    And,
    /// Disjunction
    Or,
}

/// Single-operand boolean operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnaryLogicalOp {
    /// Negation
    Not,
    /// Branch: exactly one of the two programs is evaluated
    Diverge {
        /// Taken when the operand is `true`
        is_true: ProgramRef,
        /// Taken when the operand is `false`
        is_false: ProgramRef,
    },
}

impl BinaryMathOp {
    /// Stable lowercase name, shared with the canonical encoding
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Modulo => "modulo",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanEqual => "greater_than_equal",
        }
    }

    /// Inverse of [`BinaryMathOp::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(Self::Add),
            "multiply" => Some(Self::Multiply),
            "divide" => Some(Self::Divide),
            "modulo" => Some(Self::Modulo),
            "greater_than" => Some(Self::GreaterThan),
            "greater_than_equal" => Some(Self::GreaterThanEqual),
            _ => None,
        }
    }
}

impl UnaryMathOp {
    /// Stable lowercase name, shared with the canonical encoding
    pub fn name(self) -> &'static str {
        match self {
            Self::Negate => "negate",
        }
    }

    /// Inverse of [`UnaryMathOp::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "negate" => Some(Self::Negate),
            _ => None,
        }
    }
}

impl BinaryLogicalOp {
    /// Stable lowercase name, shared with the canonical encoding
    pub fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Inverse of [`BinaryLogicalOp::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

impl CompiledProgram {
    /// `Identity`
    pub fn identity() -> Self {
        Self::Identity
    }

    /// `Lookup(binding)`
    pub fn lookup(binding: Binding) -> Self {
        Self::Lookup(binding)
    }

    /// `Literal(value, constructor)`
    pub fn literal(value: impl Into<RuntimeValue>, constructor: ConstructorKind) -> Self {
        Self::Literal {
            value: value.into(),
            constructor,
        }
    }

    /// `Immediate(inner)`
    pub fn immediate(inner: CompiledProgram) -> Self {
        Self::Immediate(Arc::new(inner))
    }

    /// `Defer(inner)`
    pub fn defer(inner: CompiledProgram) -> Self {
        Self::Defer(Arc::new(inner))
    }

    /// `FunctionDef(binding, body, input)`
    pub fn function_def(binding: Binding, body: CompiledProgram, input: CompiledProgram) -> Self {
        Self::FunctionDef {
            binding,
            body: Arc::new(body),
            input: Arc::new(input),
        }
    }

    /// `Pipe(left, right)`
    pub fn pipe(left: CompiledProgram, right: CompiledProgram) -> Self {
        Self::Pipe {
            left: Arc::new(left),
            right: Arc::new(right),
        }
    }

    /// `EqualTo(left, right, tag)`
    pub fn equal_to(left: CompiledProgram, right: CompiledProgram, tag: EquatableKind) -> Self {
        Self::EqualTo {
            left: Arc::new(left),
            right: Arc::new(right),
            tag,
        }
    }

    /// `Math(Binary(op, left, right), tag)`
    pub fn math_binary(
        op: BinaryMathOp,
        left: CompiledProgram,
        right: CompiledProgram,
        tag: NumericKind,
    ) -> Self {
        Self::Math {
            operation: MathOperation::Binary {
                op,
                left: Arc::new(left),
                right: Arc::new(right),
            },
            tag,
        }
    }

    /// `Math(Unary(op, operand), tag)`
    pub fn math_unary(op: UnaryMathOp, operand: CompiledProgram, tag: NumericKind) -> Self {
        Self::Math {
            operation: MathOperation::Unary {
                op,
                operand: Arc::new(operand),
            },
            tag,
        }
    }

    /// `Logical(Binary(op, left, right))`
    pub fn logical_binary(op: BinaryLogicalOp, left: CompiledProgram, right: CompiledProgram) -> Self {
        Self::Logical(LogicalOperation::Binary {
            op,
            left: Arc::new(left),
            right: Arc::new(right),
        })
    }

    /// `Logical(Unary(operand, Not))`
    pub fn not(operand: CompiledProgram) -> Self {
        Self::Logical(LogicalOperation::Unary {
            operand: Arc::new(operand),
            op: UnaryLogicalOp::Not,
        })
    }

    /// `Logical(Unary(operand, Diverge(is_true, is_false)))`
    pub fn diverge(operand: CompiledProgram, is_true: CompiledProgram, is_false: CompiledProgram) -> Self {
        Self::Logical(LogicalOperation::Unary {
            operand: Arc::new(operand),
            op: UnaryLogicalOp::Diverge {
                is_true: Arc::new(is_true),
                is_false: Arc::new(is_false),
            },
        })
    }

    /// `TupleGetIndex(tuple, index)`
    pub fn tuple_get_index(tuple: CompiledProgram, index: usize) -> Self {
        Self::TupleGetIndex {
            tuple: Arc::new(tuple),
            index,
        }
    }

    /// Name of the node used in diagnostics and in the canonical encoding
    pub fn node_kind(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Lookup(_) => "lookup",
            Self::Immediate(_) => "immediate",
            Self::Defer(_) => "defer",
            Self::FunctionDef { .. } => "function_def",
            Self::Literal { .. } => "literal",
            Self::Pipe { .. } => "pipe",
            Self::EqualTo { .. } => "equal_to",
            Self::Math { .. } => "math",
            Self::Logical(_) => "logical",
            Self::TupleGetIndex { .. } => "tuple_get_index",
        }
    }

    /// Direct sub-programs in evaluation order
    pub fn children(&self) -> Vec<&ProgramRef> {
        match self {
            Self::Identity | Self::Lookup(_) | Self::Literal { .. } => Vec::new(),
            Self::Immediate(inner) | Self::Defer(inner) => vec![inner],
            Self::FunctionDef { body, input, .. } => vec![input, body],
            Self::Pipe { left, right } | Self::EqualTo { left, right, .. } => vec![left, right],
            Self::Math { operation, .. } => match operation {
                MathOperation::Binary { left, right, .. } => vec![left, right],
                MathOperation::Unary { operand, .. } => vec![operand],
            },
            Self::Logical(operation) => match operation {
                LogicalOperation::Binary { left, right, .. } => vec![left, right],
                LogicalOperation::Unary { operand, op } => match op {
                    UnaryLogicalOp::Not => vec![operand],
                    UnaryLogicalOp::Diverge { is_true, is_false } => vec![operand, is_true, is_false],
                },
            },
            Self::TupleGetIndex { tuple, .. } => vec![tuple],
        }
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn increment() -> CompiledProgram {
        let b = Binding::from_raw(0);
        CompiledProgram::function_def(
            b,
            CompiledProgram::pipe(
                CompiledProgram::lookup(b),
                CompiledProgram::math_binary(
                    BinaryMathOp::Add,
                    CompiledProgram::identity(),
                    CompiledProgram::literal(1i64, ConstructorKind::Integer),
                    NumericKind::Integer,
                ),
            ),
            CompiledProgram::literal(41i64, ConstructorKind::Integer),
        )
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(increment(), increment());
        assert_ne!(increment(), CompiledProgram::identity());
    }

    #[test]
    fn test_metrics() {
        let program = increment();
        assert_eq!(program.node_count(), 7);
        assert_eq!(program.depth(), 4);
    }

    #[test]
    fn test_children_order() {
        let program = increment();
        let kinds: Vec<_> = program.children().iter().map(|c| c.node_kind()).collect();
        assert_eq!(kinds, vec!["literal", "pipe"]);
    }

    #[test]
    fn test_op_names_round_trip() {
        for op in [
            BinaryMathOp::Add,
            BinaryMathOp::Multiply,
            BinaryMathOp::Divide,
            BinaryMathOp::Modulo,
            BinaryMathOp::GreaterThan,
            BinaryMathOp::GreaterThanEqual,
        ] {
            assert_eq!(BinaryMathOp::from_name(op.name()), Some(op));
        }
    }

    #[test]
    fn test_programs_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledProgram>();
    }
}
