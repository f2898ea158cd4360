//! Expression compiler
//!
//! Lowering is a post-order walk: operands are compiled before the node that
//! uses them. The only state is the binding counter in [`CompilationContext`],
//! consulted once per function definition site. Compilation cannot fail.

use std::sync::Arc;

use super::context::CompilationContext;
use crate::expression::{Expression, ExpressionNode};
use crate::ir::{
    CompiledProgram, LogicalOperation, MathOperation, ProgramRef, UnaryLogicalOp,
};

/// Compile an expression with a fresh compilation context
pub fn compile<T>(expression: &Expression<T>) -> CompiledProgram {
    let mut context = CompilationContext::new();
    compile_with(expression, &mut context)
}

/// Compile an expression, allocating bindings from `context`
pub fn compile_with<T>(expression: &Expression<T>, context: &mut CompilationContext) -> CompiledProgram {
    let program = lower(&expression.node, context);
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "Compiled expression into {} nodes, {} bindings allocated",
            program.node_count(),
            context.allocated()
        );
    }
    program
}

fn lower(node: &ExpressionNode, context: &mut CompilationContext) -> CompiledProgram {
    match node {
        ExpressionNode::Identity => CompiledProgram::Identity,
        ExpressionNode::Lookup(binding) => CompiledProgram::Lookup(*binding),
        ExpressionNode::Literal(value, constructor) => CompiledProgram::Literal {
            value: value.clone(),
            constructor: *constructor,
        },
        ExpressionNode::Immediate(inner) => CompiledProgram::Immediate(lower_ref(inner, context)),
        ExpressionNode::Defer(inner) => CompiledProgram::Defer(lower_ref(inner, context)),
        ExpressionNode::FunctionDef { input, body } => {
            let binding = context.allocate();
            let input = lower_ref(input, context);
            let body = lower_ref(&body(binding), context);
            CompiledProgram::FunctionDef {
                binding,
                body,
                input,
            }
        }
        ExpressionNode::Pipe(left, right) => CompiledProgram::Pipe {
            left: lower_ref(left, context),
            right: lower_ref(right, context),
        },
        ExpressionNode::EqualTo(left, right, tag) => CompiledProgram::EqualTo {
            left: lower_ref(left, context),
            right: lower_ref(right, context),
            tag: *tag,
        },
        ExpressionNode::MathBinary(op, left, right, tag) => CompiledProgram::Math {
            operation: MathOperation::Binary {
                op: *op,
                left: lower_ref(left, context),
                right: lower_ref(right, context),
            },
            tag: *tag,
        },
        ExpressionNode::MathUnary(op, operand, tag) => CompiledProgram::Math {
            operation: MathOperation::Unary {
                op: *op,
                operand: lower_ref(operand, context),
            },
            tag: *tag,
        },
        ExpressionNode::LogicalBinary(op, left, right) => {
            CompiledProgram::Logical(LogicalOperation::Binary {
                op: *op,
                left: lower_ref(left, context),
                right: lower_ref(right, context),
            })
        }
        ExpressionNode::Not(operand) => CompiledProgram::Logical(LogicalOperation::Unary {
            operand: lower_ref(operand, context),
            op: UnaryLogicalOp::Not,
        }),
        ExpressionNode::Diverge(condition, on_true, on_false) => {
            let operand = lower_ref(condition, context);
            let is_true = lower_branch(on_true, context);
            let is_false = lower_branch(on_false, context);
            CompiledProgram::Logical(LogicalOperation::Unary {
                operand,
                op: UnaryLogicalOp::Diverge { is_true, is_false },
            })
        }
        ExpressionNode::TupleGetIndex(tuple, index) => CompiledProgram::TupleGetIndex {
            tuple: lower_ref(tuple, context),
            index: *index,
        },
    }
}

fn lower_ref(node: &ExpressionNode, context: &mut CompilationContext) -> ProgramRef {
    Arc::new(lower(node, context))
}

/// Diverge branches are always deferred
fn lower_branch(node: &ExpressionNode, context: &mut CompilationContext) -> ProgramRef {
    match lower(node, context) {
        deferred @ CompiledProgram::Defer(_) => Arc::new(deferred),
        strict => Arc::new(CompiledProgram::Defer(Arc::new(strict))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ConstructorKind, Equatable, Numeric, NumericKind};
    use crate::expression::Function;
    use crate::ir::{BinaryMathOp, Binding};

    #[test]
    fn test_compile_literal() {
        let program = compile(&Expression::integer(42));
        assert_eq!(
            program,
            CompiledProgram::literal(42i64, ConstructorKind::Integer)
        );
    }

    #[test]
    fn test_compile_let_binding() {
        let expr = Expression::let_in(Expression::integer(41), |x| {
            x.pipe(Expression::identity().add(Expression::integer(1), Numeric::integer()))
        });

        let b = Binding::from_raw(0);
        let expected = CompiledProgram::function_def(
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
        );
        assert_eq!(compile(&expr), expected);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let inc = Function::new(|x: Expression<i64>| x.add(Expression::integer(1), Numeric::integer()));
        let expr = inc.apply(inc.apply(Expression::integer(0)));
        assert_eq!(compile(&expr), compile(&expr));
    }

    #[test]
    fn test_shared_function_gets_distinct_bindings() {
        let inc = Function::new(|x: Expression<i64>| x.add(Expression::integer(1), Numeric::integer()));
        let once = inc.apply(Expression::integer(0));
        let expr = once.clone().equal_to(once, Equatable::integer());

        let program = compile(&expr);
        let CompiledProgram::EqualTo { left, right, .. } = &program else {
            panic!("expected EqualTo, got {program}");
        };
        let (
            CompiledProgram::FunctionDef { binding: l, .. },
            CompiledProgram::FunctionDef { binding: r, .. },
        ) = (left.as_ref(), right.as_ref())
        else {
            panic!("expected two function definitions");
        };
        assert_ne!(l, r);
        assert_eq!(program.validate(), Ok(()));
    }

    #[test]
    fn test_input_is_allocated_after_its_binding() {
        let expr = Expression::let_in(
            Expression::let_in(Expression::integer(1), |inner| inner),
            |outer| outer,
        );
        let CompiledProgram::FunctionDef { binding, input, .. } = compile(&expr) else {
            panic!("expected FunctionDef");
        };
        assert_eq!(binding, Binding::from_raw(0));
        assert!(matches!(
            input.as_ref(),
            CompiledProgram::FunctionDef { binding, .. } if *binding == Binding::from_raw(1)
        ));
    }

    #[test]
    fn test_diverge_branches_are_deferred_once() {
        let expr = Expression::boolean(true)
            .diverge(Expression::integer(1).defer(), Expression::integer(2));
        let expected = CompiledProgram::diverge(
            CompiledProgram::literal(true, ConstructorKind::Boolean),
            CompiledProgram::defer(CompiledProgram::literal(1i64, ConstructorKind::Integer)),
            CompiledProgram::defer(CompiledProgram::literal(2i64, ConstructorKind::Integer)),
        );
        assert_eq!(compile(&expr), expected);
    }

    #[test]
    fn test_compile_with_shared_context_continues_numbering() {
        let mut context = CompilationContext::new();
        let expr = Expression::let_in(Expression::integer(1), |x| x);
        let first = compile_with(&expr, &mut context);
        let second = compile_with(&expr, &mut context);
        assert_ne!(first, second);
        assert_eq!(context.allocated(), 2);
    }
}
