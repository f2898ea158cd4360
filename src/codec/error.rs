// Error types for the canonical program encoding

use thiserror::Error;

use crate::ir::IrError;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while decoding an encoded program
#[derive(Error, Debug)]
pub enum CodecError {
    /// Envelope declares a format version this build does not understand
    #[error("Unsupported encoding version {found}, expected {supported}")]
    UnsupportedVersion {
        /// Version found in the envelope
        found: u64,
        /// Version produced by this build
        supported: u64,
    },

    /// Envelope without a numeric `version` field
    #[error("Encoded program has no version")]
    MissingVersion,

    /// Node with an unrecognised `kind`
    #[error("Unknown node kind '{0}'")]
    UnknownKind(String),

    /// Unrecognised operator, capability tag or value type name
    #[error("Unknown {field} '{name}'")]
    UnknownTag {
        /// Field holding the name
        field: &'static str,
        /// Name found
        name: String,
    },

    /// Required field absent from a node
    #[error("Node '{kind}' is missing field '{field}'")]
    MissingField {
        /// Kind of the node being decoded
        kind: String,
        /// Name of the absent field
        field: &'static str,
    },

    /// Field present with the wrong JSON shape
    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        /// Name of the field
        field: &'static str,
        /// Description of the accepted shape
        expected: &'static str,
    },

    /// Input nests deeper than the configured evaluation depth allows
    #[error("Nesting depth {depth} exceeds the limit of {limit}")]
    TooDeep {
        /// Depth reached when the limit was crossed
        depth: usize,
        /// Largest accepted depth
        limit: usize,
    },

    /// Input is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Decoded program is not well formed
    #[error("Malformed program: {0}")]
    Malformed(#[from] IrError),
}
