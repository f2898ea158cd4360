//! Canonical program encoding
//!
//! Compiled programs travel between processes as JSON documents wrapped in a
//! versioned envelope:
//!
//! ```json
//! {"program": {"kind": "identity"}, "version": 1}
//! ```
//!
//! Nodes are objects tagged by `kind`; runtime values are tagged by `type`,
//! with decimals written as strings. Object keys are always sorted, which makes
//! the byte form canonical and suitable for content digests.

#![warn(missing_docs)]

mod decode;
mod encode;
mod error;

pub use decode::{
    decode, decode_node, decode_unvalidated, decode_value, decode_with, from_slice,
    from_slice_with,
};
pub use encode::{encode, encode_node, encode_value, to_canonical_bytes};
pub use error::{CodecError, CodecResult};

/// Envelope version written by [`encode`] and accepted by [`decode`]
pub const FORMAT_VERSION: u64 = 1;
