//! Content digests of compiled programs

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::codec;
use crate::ir::CompiledProgram;

/// SHA-256 of a program's canonical encoding
///
/// Structurally equal programs share a digest, so the digest can key caches and
/// stored artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramDigest([u8; 32]);

/// Text that is not a 64 character hex digest
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid program digest '{0}'")]
pub struct DigestParseError(String);

impl ProgramDigest {
    /// Digest of `program`
    pub fn of(program: &CompiledProgram) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(codec::to_canonical_bytes(program));
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the hex form
    pub fn from_hex(text: &str) -> Result<Self, DigestParseError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(text, &mut bytes).map_err(|_| DigestParseError(text.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ProgramDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ProgramDigest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::ConstructorKind;

    #[test]
    fn test_equal_programs_share_digest() {
        let a = CompiledProgram::literal(1i64, ConstructorKind::Integer);
        let b = CompiledProgram::literal(1i64, ConstructorKind::Integer);
        let c = CompiledProgram::literal(2i64, ConstructorKind::Integer);
        assert_eq!(ProgramDigest::of(&a), ProgramDigest::of(&b));
        assert_ne!(ProgramDigest::of(&a), ProgramDigest::of(&c));
    }

    #[test]
    fn test_constructor_is_part_of_digest() {
        let a = CompiledProgram::literal(1i64, ConstructorKind::Integer);
        let b = CompiledProgram::literal(1i64, ConstructorKind::Any);
        assert_ne!(ProgramDigest::of(&a), ProgramDigest::of(&b));
    }

    #[test]
    fn test_hex_round_trip() {
        let digest = ProgramDigest::of(&CompiledProgram::identity());
        let text = digest.to_string();
        assert_eq!(text.len(), 64);
        assert_eq!(text.parse::<ProgramDigest>(), Ok(digest));
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert!(ProgramDigest::from_hex("abc").is_err());
        assert!(ProgramDigest::from_hex(&"zz".repeat(32)).is_err());
    }
}
