//! Evaluation context
//!
//! The context maps bindings to values through a persistent chain of frames.
//! Extending a context allocates one new frame pointing at the old chain; the
//! old context is never modified, so an evaluation returning from a function
//! body observes its own scope again and concurrent evaluations never interfere.
//!
//! # Resolution order
//!
//! Lookups walk from the newest frame to the oldest; the first frame carrying
//! the binding wins.

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

use super::error::EvaluationResult;
use crate::ir::{Binding, CompiledProgram, ProgramRef};
use crate::model::RuntimeValue;

/// Ambient capabilities available to every evaluation in a context chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Fractional digits kept by decimal division, unlimited when `None`
    pub decimal_scale: Option<u32>,
}

/// A program captured with its scope, evaluated at most once on demand
pub struct Thunk {
    program: ProgramRef,
    context: EvaluationContext,
    subject: RuntimeValue,
    cell: OnceCell<EvaluationResult<RuntimeValue>>,
}

impl Thunk {
    pub(crate) fn new(program: ProgramRef, context: EvaluationContext, subject: RuntimeValue) -> Self {
        Self {
            program,
            context,
            subject,
            cell: OnceCell::new(),
        }
    }

    /// The deferred program
    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    /// Whether the thunk has already been forced
    pub fn is_forced(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Force the thunk with `evaluate`, memoising the outcome
    pub(crate) fn force_with<F>(&self, evaluate: F) -> EvaluationResult<RuntimeValue>
    where
        F: FnOnce(&CompiledProgram, &EvaluationContext, &RuntimeValue) -> EvaluationResult<RuntimeValue>,
    {
        self.cell
            .get_or_init(|| evaluate(&self.program, &self.context, &self.subject))
            .clone()
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("program", &self.program.node_kind())
            .field("forced", &self.is_forced())
            .finish()
    }
}

/// Content of a binding slot
#[derive(Debug, Clone)]
pub enum Slot {
    /// An evaluated value
    Ready(RuntimeValue),
    /// A deferred input, forced on first lookup
    Deferred(Arc<Thunk>),
}

struct Frame {
    binding: Binding,
    slot: Slot,
    parent: Option<Arc<Frame>>,
}

/// Immutable, chainable binding environment
#[derive(Clone, Default)]
pub struct EvaluationContext {
    head: Option<Arc<Frame>>,
    capabilities: Arc<Capabilities>,
}

impl EvaluationContext {
    /// Empty context with default capabilities
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty context with the given capabilities
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            head: None,
            capabilities: Arc::new(capabilities),
        }
    }

    /// Ambient capabilities
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// New context with `binding` bound to `value`
    pub fn extend(&self, binding: Binding, value: RuntimeValue) -> Self {
        self.extend_slot(binding, Slot::Ready(value))
    }

    /// New context with `binding` bound to `slot`
    pub fn extend_slot(&self, binding: Binding, slot: Slot) -> Self {
        Self {
            head: Some(Arc::new(Frame {
                binding,
                slot,
                parent: self.head.clone(),
            })),
            capabilities: Arc::clone(&self.capabilities),
        }
    }

    /// The slot bound to `binding`, searching newest frames first
    pub fn slot(&self, binding: Binding) -> Option<&Slot> {
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            if current.binding == binding {
                return Some(&current.slot);
            }
            frame = current.parent.as_deref();
        }
        None
    }

    /// The evaluated value bound to `binding`, if bound and not deferred
    pub fn get(&self, binding: Binding) -> Option<&RuntimeValue> {
        match self.slot(binding)? {
            Slot::Ready(value) => Some(value),
            Slot::Deferred(_) => None,
        }
    }

    /// Whether `binding` is visible in this context
    pub fn contains(&self, binding: Binding) -> bool {
        self.slot(binding).is_some()
    }

    /// Number of frames in the chain
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            count += 1;
            frame = current.parent.as_deref();
        }
        count
    }

    /// Whether no binding is visible
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bindings = Vec::new();
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            bindings.push(current.binding);
            frame = current.parent.as_deref();
        }
        f.debug_struct("EvaluationContext")
            .field("bindings", &bindings)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_does_not_modify_parent() {
        let b = Binding::from_raw(0);
        let root = EvaluationContext::new();
        let child = root.extend(b, RuntimeValue::Integer(1));

        assert!(root.get(b).is_none());
        assert_eq!(child.get(b), Some(&RuntimeValue::Integer(1)));
        assert_eq!(child.len(), 1);
        assert!(root.is_empty());
    }

    #[test]
    fn test_newest_frame_wins() {
        let b = Binding::from_raw(0);
        let ctx = EvaluationContext::new()
            .extend(b, RuntimeValue::Integer(1))
            .extend(b, RuntimeValue::Integer(2));
        assert_eq!(ctx.get(b), Some(&RuntimeValue::Integer(2)));
    }

    #[test]
    fn test_siblings_are_isolated() {
        let (a, b) = (Binding::from_raw(0), Binding::from_raw(1));
        let root = EvaluationContext::new();
        let left = root.extend(a, RuntimeValue::from("left"));
        let right = root.extend(b, RuntimeValue::from("right"));
        assert!(!left.contains(b));
        assert!(!right.contains(a));
    }

    #[test]
    fn test_capabilities_survive_extension() {
        let ctx = EvaluationContext::with_capabilities(Capabilities {
            decimal_scale: Some(3),
        })
        .extend(Binding::from_raw(0), RuntimeValue::Unit);
        assert_eq!(ctx.capabilities().decimal_scale, Some(3));
    }

    #[test]
    fn test_thunk_is_memoised() {
        let thunk = Thunk::new(
            Arc::new(CompiledProgram::Identity),
            EvaluationContext::new(),
            RuntimeValue::Integer(7),
        );
        assert!(!thunk.is_forced());

        let mut calls = 0;
        let first = thunk.force_with(|_, _, subject| {
            calls += 1;
            Ok(subject.clone())
        });
        let second = thunk.force_with(|_, _, _| unreachable!("already forced"));

        assert_eq!(first, Ok(RuntimeValue::Integer(7)));
        assert_eq!(second, first);
        assert_eq!(calls, 1);
        assert!(thunk.is_forced());
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EvaluationContext>();
    }
}
