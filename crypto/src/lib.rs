//! Hashing used for object identifiers and state checksums.
//!
//! Everything consensus-related hashes with BLAKE2b-256. Callers treat the
//! digest as opaque; no other primitive is exposed.

use blake2::digest::{Update, VariableOutput};
use blake2::VarBlake2b;
use primitives::H256;

/// BLAKE2b-256 of the input.
pub fn hash256(data: &[u8]) -> H256 {
    let mut hasher = Hasher::default();
    hasher.update(data);
    hasher.finalize()
}

/// Incremental BLAKE2b-256.
pub struct Hasher(VarBlake2b);

impl Default for Hasher {
    fn default() -> Self {
        Hasher(VarBlake2b::new(32).expect("32 is a valid blake2b output size; qed"))
    }
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finalize(self) -> H256 {
        let mut result = [0u8; 32];
        self.0.finalize_variable(|digest| result.copy_from_slice(digest));
        H256::from(result)
    }
}

#[cfg(test)]
mod tests {
    use super::{hash256, Hasher};

    #[test]
    fn test_incremental_matches_oneshot() {
        let mut hasher = Hasher::default();
        hasher.update(b"abc");
        hasher.update(b"def");
        assert_eq!(hasher.finalize(), hash256(b"abcdef"));
    }

    #[test]
    fn test_distinct_inputs_distinct_digests() {
        assert_ne!(hash256(b""), hash256(b"\x00"));
    }
}
