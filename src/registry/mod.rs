//! Program registry
//!
//! Content digests for compiled programs and a concurrent cache keyed by them.

#![warn(missing_docs)]

mod cache;
mod digest;

pub use cache::{CacheStats, ProgramCache, global_cache};
pub use digest::{DigestParseError, ProgramDigest};
