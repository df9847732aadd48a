use crate::currency::Currency;
use crate::specifiers::Specifier;
use crate::types::{FileContractId, SiacoinOutputId, SiafundOutputId, UnlockHash};
use crate::Height;
use crypto::Hasher;
use primitives::{Bytes, H256};
use ser::{serialize, Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use std::io;

/// Consumes the siacoin output named by `parent_id`, whole.
///
/// The unlock hash must match the one committed in the output; the
/// authorization proof itself is checked by an external signature verifier.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SiacoinInput {
    pub parent_id: SiacoinOutputId,
    pub unlock_hash: UnlockHash,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SiacoinOutput {
    pub value: Currency,
    pub unlock_hash: UnlockHash,
}

/// Storage agreement. `payout` funds both proof-outcome output sets plus
/// the siafund tax collected at creation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileContract {
    pub file_size: u64,
    pub file_merkle_root: H256,
    pub start_height: Height,
    pub end_height: Height,
    pub payout: Currency,
    pub valid_proof_outputs: Vec<SiacoinOutput>,
    pub missed_proof_outputs: Vec<SiacoinOutput>,
    pub unlock_hash: UnlockHash,
}

/// Resolves a file contract with the valid-proof outcome. The proof bytes
/// are opaque here and checked by an external proof verifier.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StorageProof {
    pub parent_id: FileContractId,
    pub proof: Bytes,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SiafundInput {
    pub parent_id: SiafundOutputId,
    pub unlock_hash: UnlockHash,
    /// Destination for the siacoin claim accrued by the spent output.
    pub claim_unlock_hash: UnlockHash,
}

/// `claim_start` records the siafund pool value at the moment the output
/// was created. It is ledger state: the value carried inside a transaction
/// is ignored and overwritten on application.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SiafundOutput {
    pub value: Currency,
    pub unlock_hash: UnlockHash,
    pub claim_start: Currency,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub siacoin_inputs: Vec<SiacoinInput>,
    pub siacoin_outputs: Vec<SiacoinOutput>,
    pub file_contracts: Vec<FileContract>,
    pub storage_proofs: Vec<StorageProof>,
    pub siafund_inputs: Vec<SiafundInput>,
    pub siafund_outputs: Vec<SiafundOutput>,
    pub miner_fees: Vec<Currency>,
    pub arbitrary_data: Bytes,
}

impl Transaction {
    pub fn id(&self) -> H256 {
        crypto::hash256(&serialize(self))
    }

    pub fn siacoin_output_id(&self, index: u64) -> SiacoinOutputId {
        tagged_hash(Specifier::SIACOIN_OUTPUT, &self.id(), index).into()
    }

    pub fn file_contract_id(&self, index: u64) -> FileContractId {
        tagged_hash(Specifier::FILE_CONTRACT, &self.id(), index).into()
    }

    pub fn siafund_output_id(&self, index: u64) -> SiafundOutputId {
        tagged_hash(Specifier::SIAFUND_OUTPUT, &self.id(), index).into()
    }
}

impl FileContractId {
    pub fn valid_proof_output_id(&self, index: u64) -> SiacoinOutputId {
        proof_output_id(self, 0, index)
    }

    pub fn missed_proof_output_id(&self, index: u64) -> SiacoinOutputId {
        proof_output_id(self, 1, index)
    }
}

impl SiafundOutputId {
    pub fn claim_output_id(&self) -> SiacoinOutputId {
        let mut hasher = Hasher::default();
        hasher.update(Specifier::SIAFUND_CLAIM.as_bytes());
        hasher.update(self.as_ref());
        hasher.finalize().into()
    }
}

fn tagged_hash(specifier: Specifier, parent: &H256, index: u64) -> H256 {
    let mut hasher = Hasher::default();
    hasher.update(specifier.as_bytes());
    hasher.update(parent.as_bytes());
    hasher.update(&index.to_le_bytes());
    hasher.finalize()
}

fn proof_output_id(parent: &FileContractId, outcome: u8, index: u64) -> SiacoinOutputId {
    let mut hasher = Hasher::default();
    hasher.update(Specifier::STORAGE_PROOF.as_bytes());
    hasher.update(parent.as_ref());
    hasher.update(&[outcome]);
    hasher.update(&index.to_le_bytes());
    hasher.finalize().into()
}

impl Serializable for SiacoinInput {
    fn serialize(&self, stream: &mut Stream) {
        stream.append(&self.parent_id).append(&self.unlock_hash);
    }

    fn serialized_size(&self) -> usize {
        self.parent_id.serialized_size() + self.unlock_hash.serialized_size()
    }
}

impl Deserializable for SiacoinInput {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(SiacoinInput {
            parent_id: reader.read()?,
            unlock_hash: reader.read()?,
        })
    }
}

impl Serializable for SiacoinOutput {
    fn serialize(&self, stream: &mut Stream) {
        stream.append(&self.value).append(&self.unlock_hash);
    }

    fn serialized_size(&self) -> usize {
        self.value.serialized_size() + self.unlock_hash.serialized_size()
    }
}

impl Deserializable for SiacoinOutput {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(SiacoinOutput {
            value: reader.read()?,
            unlock_hash: reader.read()?,
        })
    }
}

impl Serializable for FileContract {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.file_size)
            .append(&self.file_merkle_root)
            .append(&self.start_height)
            .append(&self.end_height)
            .append(&self.payout)
            .append_list(&self.valid_proof_outputs)
            .append_list(&self.missed_proof_outputs)
            .append(&self.unlock_hash);
    }

    fn serialized_size(&self) -> usize {
        self.file_size.serialized_size()
            + self.file_merkle_root.serialized_size()
            + self.start_height.serialized_size()
            + self.end_height.serialized_size()
            + self.payout.serialized_size()
            + ser::serialized_list_size(&self.valid_proof_outputs)
            + ser::serialized_list_size(&self.missed_proof_outputs)
            + self.unlock_hash.serialized_size()
    }
}

impl Deserializable for FileContract {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(FileContract {
            file_size: reader.read()?,
            file_merkle_root: reader.read()?,
            start_height: reader.read()?,
            end_height: reader.read()?,
            payout: reader.read()?,
            valid_proof_outputs: reader.read_list()?,
            missed_proof_outputs: reader.read_list()?,
            unlock_hash: reader.read()?,
        })
    }
}

impl Serializable for StorageProof {
    fn serialize(&self, stream: &mut Stream) {
        stream.append(&self.parent_id).append(&self.proof);
    }

    fn serialized_size(&self) -> usize {
        self.parent_id.serialized_size() + self.proof.serialized_size()
    }
}

impl Deserializable for StorageProof {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(StorageProof {
            parent_id: reader.read()?,
            proof: reader.read()?,
        })
    }
}

impl Serializable for SiafundInput {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.parent_id)
            .append(&self.unlock_hash)
            .append(&self.claim_unlock_hash);
    }

    fn serialized_size(&self) -> usize {
        self.parent_id.serialized_size()
            + self.unlock_hash.serialized_size()
            + self.claim_unlock_hash.serialized_size()
    }
}

impl Deserializable for SiafundInput {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(SiafundInput {
            parent_id: reader.read()?,
            unlock_hash: reader.read()?,
            claim_unlock_hash: reader.read()?,
        })
    }
}

impl Serializable for SiafundOutput {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.value)
            .append(&self.unlock_hash)
            .append(&self.claim_start);
    }

    fn serialized_size(&self) -> usize {
        self.value.serialized_size()
            + self.unlock_hash.serialized_size()
            + self.claim_start.serialized_size()
    }
}

impl Deserializable for SiafundOutput {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(SiafundOutput {
            value: reader.read()?,
            unlock_hash: reader.read()?,
            claim_start: reader.read()?,
        })
    }
}

impl Serializable for Transaction {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append_list(&self.siacoin_inputs)
            .append_list(&self.siacoin_outputs)
            .append_list(&self.file_contracts)
            .append_list(&self.storage_proofs)
            .append_list(&self.siafund_inputs)
            .append_list(&self.siafund_outputs)
            .append_list(&self.miner_fees)
            .append(&self.arbitrary_data);
    }

    fn serialized_size(&self) -> usize {
        ser::serialized_list_size(&self.siacoin_inputs)
            + ser::serialized_list_size(&self.siacoin_outputs)
            + ser::serialized_list_size(&self.file_contracts)
            + ser::serialized_list_size(&self.storage_proofs)
            + ser::serialized_list_size(&self.siafund_inputs)
            + ser::serialized_list_size(&self.siafund_outputs)
            + ser::serialized_list_size(&self.miner_fees)
            + self.arbitrary_data.serialized_size()
    }
}

impl Deserializable for Transaction {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(Transaction {
            siacoin_inputs: reader.read_list()?,
            siacoin_outputs: reader.read_list()?,
            file_contracts: reader.read_list()?,
            storage_proofs: reader.read_list()?,
            siafund_inputs: reader.read_list()?,
            siafund_outputs: reader.read_list()?,
            miner_fees: reader.read_list()?,
            arbitrary_data: reader.read()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{SiacoinOutput, Transaction};
    use crate::{Currency, UnlockHash};
    use primitives::H256;
    use ser::{deserialize, serialize, Serializable};

    fn sample_transaction() -> Transaction {
        Transaction {
            siacoin_outputs: vec![
                SiacoinOutput {
                    value: Currency::from(60u64),
                    unlock_hash: UnlockHash::from(H256::from_low_u64_be(1)),
                },
                SiacoinOutput {
                    value: Currency::from(40u64),
                    unlock_hash: UnlockHash::from(H256::from_low_u64_be(2)),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_transaction_roundtrip() {
        let tx = sample_transaction();
        assert_eq!(tx, deserialize(&serialize(&tx)).unwrap());
        assert_eq!(serialize(&tx).len(), tx.serialized_size());
    }

    #[test]
    fn test_output_ids_differ_per_index_and_namespace() {
        let tx = sample_transaction();
        assert_ne!(tx.siacoin_output_id(0), tx.siacoin_output_id(1));
        assert_ne!(
            tx.siacoin_output_id(0).as_hash(),
            tx.siafund_output_id(0).as_hash()
        );
    }

    #[test]
    fn test_transaction_id_commits_to_contents() {
        let tx = sample_transaction();
        let mut other = tx.clone();
        other.siacoin_outputs[0].value = Currency::from(61u64);
        assert_ne!(tx.id(), other.id());
    }
}
