//! Compiled program evaluator
//!
//! Interprets a [`CompiledProgram`](crate::ir::CompiledProgram) against a subject
//! value and an [`EvaluationContext`] holding the values of enclosing bindings.

#![warn(missing_docs)]

mod context;
mod engine;
mod error;

pub use context::{Capabilities, EvaluationContext, Slot, Thunk};
pub use engine::Evaluator;
pub use error::{EvaluationError, EvaluationResult};
