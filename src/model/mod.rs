//! Data model for expression evaluation
//!
//! This module provides the dynamic value type produced by evaluation and
//! embedded as literal payloads inside compiled programs.

#![warn(missing_docs)]

pub mod error;
pub mod value;

pub use error::{ModelError, Result};
pub use value::{Record, RuntimeValue, ValueKind};
