//! Compiler module for expressions
//!
//! This module lowers a typed [`Expression`](crate::expression::Expression) tree
//! into its [`CompiledProgram`](crate::ir::CompiledProgram).

pub mod compiler;
pub mod context;

pub use compiler::*;
pub use context::CompilationContext;
