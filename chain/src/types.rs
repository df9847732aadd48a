//! Identifier newtypes.
//!
//! Every consensus object is addressed by a 32-byte hash. Distinct newtypes
//! keep a siafund output id from ever being used to look up a siacoin
//! output.

use primitives::H256;
use ser::{Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use std::{fmt, io};

/// Block height. Genesis is at height zero.
pub type Height = u64;

macro_rules! impl_hash_newtype {
    ($name: ident) => {
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub H256);

        impl $name {
            pub fn as_hash(&self) -> &H256 {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }
        }

        impl From<H256> for $name {
            fn from(hash: H256) -> Self {
                $name(hash)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.0.as_ref()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl Serializable for $name {
            fn serialize(&self, stream: &mut Stream) {
                stream.append(&self.0);
            }

            fn serialized_size(&self) -> usize {
                32
            }
        }

        impl Deserializable for $name {
            fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
            where
                T: io::Read,
            {
                reader.read().map($name)
            }
        }
    };
}

impl_hash_newtype!(BlockId);
impl_hash_newtype!(SiacoinOutputId);
impl_hash_newtype!(FileContractId);
impl_hash_newtype!(SiafundOutputId);
impl_hash_newtype!(UnlockHash);

#[cfg(test)]
mod tests {
    use super::{BlockId, SiacoinOutputId};
    use primitives::H256;

    #[test]
    fn test_newtype_display_matches_hash() {
        let hash = H256::from_low_u64_be(7);
        assert_eq!(format!("{}", BlockId::from(hash)), format!("{}", hash));
        assert!(BlockId::default().is_zero());
    }

    #[test]
    fn test_newtype_encoding_is_raw_hash() {
        let id = SiacoinOutputId::from(H256::from_low_u64_be(9));
        assert_eq!(ser::serialize(&id), ser::serialize(&H256::from_low_u64_be(9)));
    }
}
