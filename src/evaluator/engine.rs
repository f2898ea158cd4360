//! # Program Evaluator
//!
//! Recursive interpreter for [`CompiledProgram`]s. One call walks the tree once
//! with no state beyond the [`EvaluationContext`] chain, so a single evaluator
//! and a single program can serve any number of concurrent evaluations.
//!
//! ## Features
//!
//! - **Short-circuit logic**: `And`/`Or` skip their right operand when the left decides
//! - **Exclusive branching**: `Diverge` evaluates exactly one branch
//! - **Deferred evaluation**: `Defer` yields a memoised thunk forced only on demand
//! - **Bounded depth**: nesting beyond [`EngineConfig::max_depth`] fails instead of overflowing
//!
//! ## Quick Start
//!
//! ```rust
//! use remote_expression::ir::{Binding, CompiledProgram};
//! use remote_expression::capability::{ConstructorKind, EquatableKind};
//! use remote_expression::model::RuntimeValue;
//! use remote_expression::{EvaluationContext, Evaluator};
//!
//! let b = Binding::from_raw(0);
//! let program = CompiledProgram::diverge(
//!     CompiledProgram::equal_to(
//!         CompiledProgram::lookup(b),
//!         CompiledProgram::literal(0i64, ConstructorKind::Integer),
//!         EquatableKind::Integer,
//!     ),
//!     CompiledProgram::defer(CompiledProgram::literal("zero", ConstructorKind::String)),
//!     CompiledProgram::defer(CompiledProgram::literal("nonzero", ConstructorKind::String)),
//! );
//!
//! let context = EvaluationContext::new().extend(b, RuntimeValue::Integer(5));
//! let result = Evaluator::new().evaluate(&program, &context, &RuntimeValue::Unit);
//! assert_eq!(result, Ok(RuntimeValue::from("nonzero")));
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;

use super::context::{EvaluationContext, Slot, Thunk};
use super::error::{EvaluationError, EvaluationResult};
use crate::capability::{ArithmeticFault, EquatableKind, Number, NumericKind};
use crate::config::EngineConfig;
use crate::ir::{
    BinaryLogicalOp, BinaryMathOp, CompiledProgram, LogicalOperation, MathOperation, UnaryLogicalOp,
    UnaryMathOp,
};
use crate::model::RuntimeValue;

/// Outcome of evaluating one node before anything demanded its value
enum Evaluated {
    Value(RuntimeValue),
    Deferred(Arc<Thunk>),
}

/// Interpreter for compiled programs
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EngineConfig,
}

impl Evaluator {
    /// Create an evaluator with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator with a custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate `program` against `subject` in `context`
    ///
    /// The result is always fully forced: a program whose root is deferred is
    /// evaluated here because the caller demands its value.
    pub fn evaluate(
        &self,
        program: &CompiledProgram,
        context: &EvaluationContext,
        subject: &RuntimeValue,
    ) -> EvaluationResult<RuntimeValue> {
        let result = self.demand(program, context, subject, 0);
        if let Err(err) = &result {
            log::debug!("Evaluation of {} failed: {err}", program.node_kind());
        }
        result
    }

    fn demand(
        &self,
        program: &CompiledProgram,
        context: &EvaluationContext,
        subject: &RuntimeValue,
        depth: usize,
    ) -> EvaluationResult<RuntimeValue> {
        match self.eval(program, context, subject, depth)? {
            Evaluated::Value(value) => Ok(value),
            Evaluated::Deferred(thunk) => self.force(&thunk, depth),
        }
    }

    fn force(&self, thunk: &Thunk, depth: usize) -> EvaluationResult<RuntimeValue> {
        thunk.force_with(|program, context, subject| self.demand(program, context, subject, depth + 1))
    }

    fn eval(
        &self,
        program: &CompiledProgram,
        context: &EvaluationContext,
        subject: &RuntimeValue,
        depth: usize,
    ) -> EvaluationResult<Evaluated> {
        if depth > self.config.max_depth {
            return Err(EvaluationError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        log::trace!("eval {} at depth {depth}", program.node_kind());

        let next = depth + 1;
        let value = match program {
            CompiledProgram::Identity => subject.clone(),

            CompiledProgram::Lookup(binding) => match context.slot(*binding) {
                Some(Slot::Ready(value)) => value.clone(),
                Some(Slot::Deferred(thunk)) => return Ok(Evaluated::Deferred(Arc::clone(thunk))),
                None => return Err(EvaluationError::UnboundBinding(*binding)),
            },

            CompiledProgram::Literal { value, .. } => value.clone(),

            CompiledProgram::Immediate(inner) => self.demand(inner, context, subject, next)?,

            CompiledProgram::Defer(inner) => {
                return Ok(Evaluated::Deferred(Arc::new(Thunk::new(
                    Arc::clone(inner),
                    context.clone(),
                    subject.clone(),
                ))));
            }

            CompiledProgram::FunctionDef {
                binding,
                body,
                input,
            } => {
                let slot = match self.eval(input, context, subject, next)? {
                    Evaluated::Value(value) => Slot::Ready(value),
                    Evaluated::Deferred(thunk) => Slot::Deferred(thunk),
                };
                let scope = context.extend_slot(*binding, slot);
                return self.eval(body, &scope, subject, next);
            }

            CompiledProgram::Pipe { left, right } => {
                let intermediate = self.demand(left, context, subject, next)?;
                return self.eval(right, context, &intermediate, next);
            }

            CompiledProgram::EqualTo { left, right, tag } => {
                let left = self.operand(left, context, subject, next)?;
                let right = self.operand(right, context, subject, next)?;
                RuntimeValue::Boolean(equals(*tag, &left, &right)?)
            }

            CompiledProgram::Math { operation, tag } => {
                self.math(operation, *tag, context, subject, next)?
            }

            CompiledProgram::Logical(operation) => self.logical(operation, context, subject, next)?,

            CompiledProgram::TupleGetIndex { tuple, index } => {
                let tuple = self.demand(tuple, context, subject, next)?;
                let size = tuple.len().ok_or_else(|| {
                    EvaluationError::unsupported("tuple_get_index", &[&tuple])
                })?;
                match tuple.get_index(*index) {
                    Some(element) => element.clone(),
                    None => {
                        return Err(EvaluationError::IndexOutOfRange {
                            index: *index,
                            size,
                        });
                    }
                }
            }
        };
        Ok(Evaluated::Value(value))
    }

    /// Evaluate an operand of `EqualTo` or `Math`
    ///
    /// Literal operands are first rebuilt through their constructor.
    fn operand<'p>(
        &self,
        program: &'p CompiledProgram,
        context: &EvaluationContext,
        subject: &RuntimeValue,
        depth: usize,
    ) -> EvaluationResult<Cow<'p, RuntimeValue>> {
        match program {
            CompiledProgram::Literal { value, constructor } => constructor
                .reconstruct(value)
                .ok_or(EvaluationError::ConstructionFailed {
                    expected: *constructor,
                    found: value.kind(),
                }),
            other => Ok(Cow::Owned(self.demand(other, context, subject, depth)?)),
        }
    }

    fn math(
        &self,
        operation: &MathOperation,
        tag: NumericKind,
        context: &EvaluationContext,
        subject: &RuntimeValue,
        depth: usize,
    ) -> EvaluationResult<RuntimeValue> {
        match operation {
            MathOperation::Binary { op, left, right } => {
                let left = self.operand(left, context, subject, depth)?;
                let right = self.operand(right, context, subject, depth)?;
                let node = binary_node_name(*op);
                let (l, r) = match (tag.read(&left), tag.read(&right)) {
                    (Some(l), Some(r)) => (l, r),
                    _ => {
                        return Err(EvaluationError::unsupported(
                            node,
                            &[left.as_ref(), right.as_ref()],
                        ));
                    }
                };
                let fault = |fault: ArithmeticFault| EvaluationError::ArithmeticError {
                    operation: op.name(),
                    fault,
                };
                // A scale carried by the context overrides the evaluator's own.
                let scale = context
                    .capabilities()
                    .decimal_scale
                    .or(self.config.decimal_scale);
                Ok(match op {
                    BinaryMathOp::Add => RuntimeValue::from(tag.add(l, r).map_err(fault)?),
                    BinaryMathOp::Multiply => RuntimeValue::from(tag.multiply(l, r).map_err(fault)?),
                    BinaryMathOp::Divide => RuntimeValue::from(tag.divide(l, r, scale).map_err(fault)?),
                    BinaryMathOp::Modulo => RuntimeValue::from(tag.modulo(l, r).map_err(fault)?),
                    BinaryMathOp::GreaterThan => {
                        RuntimeValue::Boolean(tag.compare(l, r) == Ordering::Greater)
                    }
                    BinaryMathOp::GreaterThanEqual => {
                        RuntimeValue::Boolean(tag.compare(l, r) != Ordering::Less)
                    }
                })
            }
            MathOperation::Unary { op, operand } => {
                let operand = self.operand(operand, context, subject, depth)?;
                let number: Number = tag
                    .read(&operand)
                    .ok_or_else(|| EvaluationError::unsupported("math.negate", &[operand.as_ref()]))?;
                match op {
                    UnaryMathOp::Negate => tag
                        .negate(number)
                        .map(RuntimeValue::from)
                        .map_err(|fault| EvaluationError::ArithmeticError {
                            operation: op.name(),
                            fault,
                        }),
                }
            }
        }
    }

    fn logical(
        &self,
        operation: &LogicalOperation,
        context: &EvaluationContext,
        subject: &RuntimeValue,
        depth: usize,
    ) -> EvaluationResult<RuntimeValue> {
        match operation {
            LogicalOperation::Binary { op, left, right } => {
                let node = match op {
                    BinaryLogicalOp::And => "logical.and",
                    BinaryLogicalOp::Or => "logical.or",
                };
                let left = self.boolean(left, context, subject, depth, node)?;
                // The right operand is only reached when the left one does not decide.
                let decided = match op {
                    BinaryLogicalOp::And => !left,
                    BinaryLogicalOp::Or => left,
                };
                if decided {
                    return Ok(RuntimeValue::Boolean(left));
                }
                let right = self.boolean(right, context, subject, depth, node)?;
                Ok(RuntimeValue::Boolean(right))
            }
            LogicalOperation::Unary { operand, op } => match op {
                UnaryLogicalOp::Not => {
                    let value = self.boolean(operand, context, subject, depth, "logical.not")?;
                    Ok(RuntimeValue::Boolean(!value))
                }
                UnaryLogicalOp::Diverge { is_true, is_false } => {
                    let condition = self.boolean(operand, context, subject, depth, "logical.diverge")?;
                    let branch = if condition { is_true } else { is_false };
                    self.demand(branch, context, subject, depth)
                }
            },
        }
    }

    fn boolean(
        &self,
        program: &CompiledProgram,
        context: &EvaluationContext,
        subject: &RuntimeValue,
        depth: usize,
        node: &'static str,
    ) -> EvaluationResult<bool> {
        let value = self.demand(program, context, subject, depth)?;
        value
            .as_bool()
            .ok_or_else(|| EvaluationError::unsupported(node, &[&value]))
    }
}

fn equals(tag: EquatableKind, left: &RuntimeValue, right: &RuntimeValue) -> EvaluationResult<bool> {
    tag.equals(left, right)
        .ok_or_else(|| EvaluationError::unsupported("equal_to", &[left, right]))
}

fn binary_node_name(op: BinaryMathOp) -> &'static str {
    match op {
        BinaryMathOp::Add => "math.add",
        BinaryMathOp::Multiply => "math.multiply",
        BinaryMathOp::Divide => "math.divide",
        BinaryMathOp::Modulo => "math.modulo",
        BinaryMathOp::GreaterThan => "math.greater_than",
        BinaryMathOp::GreaterThanEqual => "math.greater_than_equal",
    }
}
