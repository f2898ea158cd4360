// Error types for program evaluation

use thiserror::Error;

use crate::capability::{ArithmeticFault, ConstructorKind};
use crate::ir::Binding;
use crate::model::ValueKind;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur while evaluating a compiled program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Lookup of a binding with no value in scope; the program is malformed
    #[error("Binding {0} is not bound in the evaluation context")]
    UnboundBinding(Binding),

    /// A literal payload does not have the shape its constructor expects
    #[error("Cannot construct {expected} from a {found} literal")]
    ConstructionFailed {
        /// Constructor recorded on the literal
        expected: ConstructorKind,
        /// Kind of the embedded payload
        found: ValueKind,
    },

    /// Division or modulo by zero, or numeric overflow
    #[error("Arithmetic error in {operation}: {fault}")]
    ArithmeticError {
        /// Operator name
        operation: &'static str,
        /// What went wrong
        fault: ArithmeticFault,
    },

    /// Tuple projection past the end of the value
    #[error("Index {index} out of range for tuple of size {size}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of elements available
        size: usize,
    },

    /// Well-formed node applied to operands it has no semantics for
    #[error("Unsupported operation {node} on ({})", list_kinds(.operands))]
    UnsupportedOperation {
        /// Node and operator, e.g. `math.add`
        node: &'static str,
        /// Kinds of the evaluated operands
        operands: Vec<ValueKind>,
    },

    /// Evaluation nested deeper than the configured limit
    #[error("Evaluation depth limit of {limit} exceeded")]
    DepthLimitExceeded {
        /// Configured limit
        limit: usize,
    },
}

impl EvaluationError {
    /// Whether the error points at a defect in the program rather than its input
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::UnboundBinding(_))
    }

    pub(crate) fn unsupported(node: &'static str, operands: &[&crate::model::RuntimeValue]) -> Self {
        Self::UnsupportedOperation {
            node,
            operands: operands.iter().map(|value| value.kind()).collect(),
        }
    }
}

fn list_kinds(kinds: &[ValueKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}
