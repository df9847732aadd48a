//! Fixed-width 256-bit hash.

use rustc_hex::{FromHex, FromHexError, ToHex};
use std::{cmp, fmt, hash, ops, str};

/// 32-byte hash, stored and displayed in canonical byte order.
#[derive(Clone, Copy, Default)]
pub struct H256([u8; 32]);

impl H256 {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Builds a hash whose last 8 bytes are the big-endian representation
    /// of the given value.
    pub fn from_low_u64_be(v: u64) -> Self {
        let mut result = H256::default();
        result.0[24..32].copy_from_slice(&v.to_be_bytes());
        result
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl From<[u8; 32]> for H256 {
    fn from(v: [u8; 32]) -> Self {
        H256(v)
    }
}

impl From<H256> for [u8; 32] {
    fn from(v: H256) -> Self {
        v.0
    }
}

impl<'a> From<&'a [u8]> for H256 {
    /// Panics when the slice length is not 32.
    fn from(v: &[u8]) -> Self {
        let mut result = H256::default();
        result.0.copy_from_slice(v);
        result
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ops::Index<usize> for H256 {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.0[index]
    }
}

impl str::FromStr for H256 {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vec: Vec<u8> = s.from_hex()?;
        match vec.len() {
            32 => {
                let mut result = [0u8; 32];
                result.copy_from_slice(&vec);
                Ok(H256(result))
            }
            _ => Err(FromHexError::InvalidHexLength),
        }
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_hex::<String>())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_hex::<String>())
    }
}

impl cmp::PartialEq for H256 {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl cmp::Eq for H256 {}

impl cmp::PartialOrd for H256 {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl cmp::Ord for H256 {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.0[..].cmp(&other.0[..])
    }
}

impl hash::Hash for H256 {
    fn hash<H>(&self, state: &mut H)
    where
        H: hash::Hasher,
    {
        state.write(&self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::H256;

    #[test]
    fn test_hash_from_str() {
        let hash: H256 = "0000000000000000000000000000000000000000000000000000000000000001"
            .parse()
            .unwrap();
        assert_eq!(hash, H256::from_low_u64_be(1));
        assert!("0001".parse::<H256>().is_err());
    }

    #[test]
    fn test_hash_ordering_is_bytewise() {
        let one = H256::from_low_u64_be(1);
        let two = H256::from_low_u64_be(2);
        assert!(one < two);
        assert!(H256::default().is_zero());
        assert!(!one.is_zero());
    }
}
