//! Remote expression engine
//!
//! Typed expressions describing how a GraphQL field is computed from its parent
//! value and arguments. Expressions are compiled into a closure-free,
//! serializable [`CompiledProgram`] that can be stored, digested, shipped to
//! another process and evaluated there against a [`RuntimeValue`].
//!
//! The pipeline is:
//!
//! 1. build an [`Expression<T>`] with the typed combinators;
//! 2. [`compile`] it into a [`CompiledProgram`];
//! 3. optionally [`codec::encode`] it or cache it in a [`ProgramCache`];
//! 4. run it with an [`Evaluator`] in an [`EvaluationContext`].

pub mod capability;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod evaluator;
pub mod expression;
pub mod ir;
pub mod model;
pub mod registry;
pub mod resolver;

// Re-export main types
pub use capability::{Constructor, Equatable, Numeric};
pub use codec::{CodecError, CodecResult};
pub use compiler::{CompilationContext, compile, compile_with};
pub use config::EngineConfig;
pub use evaluator::{EvaluationContext, EvaluationError, EvaluationResult, Evaluator};
pub use expression::{Expression, Function};
pub use ir::{Binding, CompiledProgram, ProgramRef};
pub use model::{ModelError, RuntimeValue};
pub use registry::{ProgramCache, ProgramDigest};
pub use resolver::{FieldResolver, ResolveError};
