use ser::{Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use std::{fmt, io, str};

/// 16-byte tag identifying the kind of object an identifier was derived
/// from. Distinct tags keep identifiers from colliding across namespaces.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Specifier([u8; 16]);

impl Specifier {
    pub const SIACOIN_OUTPUT: Specifier = Specifier(*b"siacoin output\0\0");
    pub const FILE_CONTRACT: Specifier = Specifier(*b"file contract\0\0\0");
    pub const STORAGE_PROOF: Specifier = Specifier(*b"storage proof\0\0\0");
    pub const SIAFUND_OUTPUT: Specifier = Specifier(*b"siafund output\0\0");
    pub const SIAFUND_CLAIM: Specifier = Specifier(*b"siafund claim\0\0\0");
    pub const MINER_PAYOUT: Specifier = Specifier(*b"miner payout\0\0\0\0");

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(16);
        match str::from_utf8(&self.0[..end]) {
            Ok(name) => write!(f, "Specifier({})", name),
            Err(_) => write!(f, "Specifier({:?})", &self.0[..]),
        }
    }
}

impl Serializable for Specifier {
    fn serialize(&self, stream: &mut Stream) {
        stream.append_slice(&self.0);
    }

    fn serialized_size(&self) -> usize {
        16
    }
}

impl Deserializable for Specifier {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        let mut buffer = [0u8; 16];
        reader.read_slice(&mut buffer)?;
        Ok(Specifier(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::Specifier;

    #[test]
    fn test_specifiers_are_distinct() {
        let all = [
            Specifier::SIACOIN_OUTPUT,
            Specifier::FILE_CONTRACT,
            Specifier::STORAGE_PROOF,
            Specifier::SIAFUND_OUTPUT,
            Specifier::SIAFUND_CLAIM,
            Specifier::MINER_PAYOUT,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(a != b);
            }
        }
    }

    #[test]
    fn test_specifier_debug() {
        assert_eq!(
            format!("{:?}", Specifier::MINER_PAYOUT),
            "Specifier(miner payout)"
        );
    }
}
