//! Capability tags
//!
//! Compiled programs erase the static type of every value. The tags in this
//! module are chosen while an expression is built, when the type is still known,
//! and travel inside the IR so the evaluator can apply the arithmetic, equality
//! and literal reconstruction rules of the original type.
//!
//! Each tag comes in two shapes:
//!
//! - a typed builder handle ([`Numeric<T>`], [`Equatable<T>`], [`Constructor<T>`])
//!   that only exists for the types it supports, so a node cannot be built
//!   without a valid tag;
//! - an erased kind ([`NumericKind`], [`EquatableKind`], [`ConstructorKind`])
//!   stored by value in the IR and interpreted at evaluation time.

#![warn(missing_docs)]

pub mod constructor;
pub mod equatable;
pub mod numeric;

pub use constructor::{Constructor, ConstructorKind};
pub use equatable::{Equatable, EquatableKind};
pub use numeric::{ArithmeticFault, Number, Numeric, NumericKind};
