//! Error types for the value model

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Model-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A JSON number that does not fit into the decimal representation
    #[error("Number {value} cannot be represented as a decimal")]
    NumberOutOfRange {
        /// Textual form of the rejected number
        value: String,
    },
}
