//! Reversible single-object changes to the ledger.
//!
//! A diff records the direction it was authored in. At commit time the
//! authoring direction is combined with an independent commit direction:
//! equal directions add the object, opposite directions remove it. Applying
//! a diff set forward and then backward therefore touches exactly the same
//! keys in exactly the opposite way.

use chain::{
    Currency, FileContract, FileContractId, Height, SiacoinOutput, SiacoinOutputId, SiafundOutput,
    SiafundOutputId,
};
use ser::{Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use std::io;
use std::ops::Not;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffDirection {
    Apply,
    Revert,
}

impl Not for DiffDirection {
    type Output = DiffDirection;

    fn not(self) -> DiffDirection {
        match self {
            DiffDirection::Apply => DiffDirection::Revert,
            DiffDirection::Revert => DiffDirection::Apply,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiacoinOutputDiff {
    pub direction: DiffDirection,
    pub id: SiacoinOutputId,
    pub siacoin_output: SiacoinOutput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContractDiff {
    pub direction: DiffDirection,
    pub id: FileContractId,
    pub file_contract: FileContract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiafundOutputDiff {
    pub direction: DiffDirection,
    pub id: SiafundOutputId,
    pub siafund_output: SiafundOutput,
}

/// Targets the delayed bucket keyed by `maturity_height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedSiacoinOutputDiff {
    pub direction: DiffDirection,
    pub id: SiacoinOutputId,
    pub siacoin_output: SiacoinOutput,
    pub maturity_height: Height,
}

/// The pool only ever grows, so this diff is asymmetric: it is always
/// authored in the apply direction and carries both the old and the new
/// pool value. Committing checks the stored pool against the expected side
/// before overwriting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiafundPoolDiff {
    pub direction: DiffDirection,
    pub previous: Currency,
    pub adjusted: Currency,
}

impl Serializable for DiffDirection {
    fn serialize(&self, stream: &mut Stream) {
        let byte = match *self {
            DiffDirection::Apply => 1u8,
            DiffDirection::Revert => 0u8,
        };
        stream.append(&byte);
    }

    fn serialized_size(&self) -> usize {
        1
    }
}

impl Deserializable for DiffDirection {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        match reader.read::<u8>()? {
            0 => Ok(DiffDirection::Revert),
            1 => Ok(DiffDirection::Apply),
            _ => Err(ReaderError::MalformedData),
        }
    }
}

impl Serializable for SiacoinOutputDiff {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.direction)
            .append(&self.id)
            .append(&self.siacoin_output);
    }

    fn serialized_size(&self) -> usize {
        self.direction.serialized_size() + 32 + self.siacoin_output.serialized_size()
    }
}

impl Deserializable for SiacoinOutputDiff {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(SiacoinOutputDiff {
            direction: reader.read()?,
            id: reader.read()?,
            siacoin_output: reader.read()?,
        })
    }
}

impl Serializable for FileContractDiff {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.direction)
            .append(&self.id)
            .append(&self.file_contract);
    }

    fn serialized_size(&self) -> usize {
        self.direction.serialized_size() + 32 + self.file_contract.serialized_size()
    }
}

impl Deserializable for FileContractDiff {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(FileContractDiff {
            direction: reader.read()?,
            id: reader.read()?,
            file_contract: reader.read()?,
        })
    }
}

impl Serializable for SiafundOutputDiff {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.direction)
            .append(&self.id)
            .append(&self.siafund_output);
    }

    fn serialized_size(&self) -> usize {
        self.direction.serialized_size() + 32 + self.siafund_output.serialized_size()
    }
}

impl Deserializable for SiafundOutputDiff {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(SiafundOutputDiff {
            direction: reader.read()?,
            id: reader.read()?,
            siafund_output: reader.read()?,
        })
    }
}

impl Serializable for DelayedSiacoinOutputDiff {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.direction)
            .append(&self.id)
            .append(&self.siacoin_output)
            .append(&self.maturity_height);
    }

    fn serialized_size(&self) -> usize {
        self.direction.serialized_size() + 32 + self.siacoin_output.serialized_size() + 8
    }
}

impl Deserializable for DelayedSiacoinOutputDiff {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(DelayedSiacoinOutputDiff {
            direction: reader.read()?,
            id: reader.read()?,
            siacoin_output: reader.read()?,
            maturity_height: reader.read()?,
        })
    }
}

impl Serializable for SiafundPoolDiff {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.direction)
            .append(&self.previous)
            .append(&self.adjusted);
    }

    fn serialized_size(&self) -> usize {
        self.direction.serialized_size()
            + self.previous.serialized_size()
            + self.adjusted.serialized_size()
    }
}

impl Deserializable for SiafundPoolDiff {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(SiafundPoolDiff {
            direction: reader.read()?,
            previous: reader.read()?,
            adjusted: reader.read()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DiffDirection, SiacoinOutputDiff};
    use chain::{Currency, SiacoinOutput};
    use ser::{deserialize, serialize};

    #[test]
    fn test_direction_inverse() {
        assert_eq!(!DiffDirection::Apply, DiffDirection::Revert);
        assert_eq!(!!DiffDirection::Apply, DiffDirection::Apply);
    }

    #[test]
    fn test_diff_roundtrip() {
        let diff = SiacoinOutputDiff {
            direction: DiffDirection::Revert,
            id: Default::default(),
            siacoin_output: SiacoinOutput {
                value: Currency::from(7u64),
                unlock_hash: Default::default(),
            },
        };
        assert_eq!(diff, deserialize(&serialize(&diff)).unwrap());
    }

    #[test]
    fn test_direction_rejects_garbage() {
        assert!(deserialize::<DiffDirection>(&[2u8][..]).is_err());
    }
}
