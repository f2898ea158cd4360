//! Well-formedness check for programs loaded from outside the compiler

use rustc_hash::FxHashSet;
use thiserror::Error;

use super::{Binding, CompiledProgram};

/// Structural defect of a compiled program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// A lookup is not enclosed by a definition of its binding
    #[error("Lookup of {0} outside the scope of its definition")]
    UnboundLookup(Binding),

    /// Two definition sites share one binding
    #[error("Binding {0} is defined more than once")]
    DuplicateBinding(Binding),
}

impl CompiledProgram {
    /// Check lexical scoping and binding uniqueness
    ///
    /// Programs produced by the compiler always pass. Programs decoded from
    /// storage are checked so that a malformed artifact is rejected at load time
    /// instead of failing with an unbound binding during a request.
    pub fn validate(&self) -> Result<(), IrError> {
        let mut defined = FxHashSet::default();
        let mut scope = Vec::new();
        check(self, &mut scope, &mut defined)
    }
}

fn check(
    program: &CompiledProgram,
    scope: &mut Vec<Binding>,
    defined: &mut FxHashSet<Binding>,
) -> Result<(), IrError> {
    match program {
        CompiledProgram::Lookup(binding) => {
            if scope.contains(binding) {
                Ok(())
            } else {
                Err(IrError::UnboundLookup(*binding))
            }
        }
        CompiledProgram::FunctionDef {
            binding,
            body,
            input,
        } => {
            if !defined.insert(*binding) {
                return Err(IrError::DuplicateBinding(*binding));
            }
            check(input, scope, defined)?;
            scope.push(*binding);
            let result = check(body, scope, defined);
            scope.pop();
            result
        }
        other => other
            .children()
            .into_iter()
            .try_for_each(|child| check(child, scope, defined)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::ConstructorKind;

    fn lit(i: i64) -> CompiledProgram {
        CompiledProgram::literal(i, ConstructorKind::Integer)
    }

    #[test]
    fn test_valid_nesting() {
        let (a, b) = (Binding::from_raw(0), Binding::from_raw(1));
        let program = CompiledProgram::function_def(
            a,
            CompiledProgram::function_def(
                b,
                CompiledProgram::pipe(CompiledProgram::lookup(a), CompiledProgram::lookup(b)),
                CompiledProgram::lookup(a),
            ),
            lit(1),
        );
        assert_eq!(program.validate(), Ok(()));
    }

    #[test]
    fn test_lookup_in_input_is_out_of_scope() {
        let a = Binding::from_raw(0);
        let program = CompiledProgram::function_def(a, lit(1), CompiledProgram::lookup(a));
        assert_eq!(program.validate(), Err(IrError::UnboundLookup(a)));
    }

    #[test]
    fn test_lookup_after_scope_ends() {
        let a = Binding::from_raw(0);
        let program = CompiledProgram::pipe(
            CompiledProgram::function_def(a, CompiledProgram::lookup(a), lit(1)),
            CompiledProgram::lookup(a),
        );
        assert_eq!(program.validate(), Err(IrError::UnboundLookup(a)));
    }

    #[test]
    fn test_duplicate_binding() {
        let a = Binding::from_raw(7);
        let def = CompiledProgram::function_def(a, CompiledProgram::lookup(a), lit(1));
        let program = CompiledProgram::pipe(def.clone(), def);
        assert_eq!(program.validate(), Err(IrError::DuplicateBinding(a)));
    }
}
