use crate::specifiers::Specifier;
use crate::transaction::{SiacoinOutput, Transaction};
use crate::types::{BlockId, SiacoinOutputId};
use crypto::Hasher;
use ser::{serialize, Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use std::io;

/// A mined block. The genesis block has a zero parent id.
///
/// Miner payouts do not become spendable immediately; they are delayed
/// outputs maturing a fixed number of blocks after this one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Block {
    pub parent_id: BlockId,
    pub nonce: u64,
    pub timestamp: u64,
    pub miner_payouts: Vec<SiacoinOutput>,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn id(&self) -> BlockId {
        BlockId::from(crypto::hash256(&serialize(self)))
    }

    pub fn miner_payout_id(&self, index: u64) -> SiacoinOutputId {
        let mut hasher = Hasher::default();
        hasher.update(Specifier::MINER_PAYOUT.as_bytes());
        hasher.update(self.id().as_ref());
        hasher.update(&index.to_le_bytes());
        hasher.finalize().into()
    }
}

impl Serializable for Block {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.parent_id)
            .append(&self.nonce)
            .append(&self.timestamp)
            .append_list(&self.miner_payouts)
            .append_list(&self.transactions);
    }

    fn serialized_size(&self) -> usize {
        self.parent_id.serialized_size()
            + self.nonce.serialized_size()
            + self.timestamp.serialized_size()
            + ser::serialized_list_size(&self.miner_payouts)
            + ser::serialized_list_size(&self.transactions)
    }
}

impl Deserializable for Block {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        Ok(Block {
            parent_id: reader.read()?,
            nonce: reader.read()?,
            timestamp: reader.read()?,
            miner_payouts: reader.read_list()?,
            transactions: reader.read_list()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use ser::{deserialize, serialize};

    #[test]
    fn test_block_roundtrip() {
        let block = Block {
            nonce: 42,
            timestamp: 100,
            ..Default::default()
        };
        assert_eq!(block, deserialize(&serialize(&block)).unwrap());
    }

    #[test]
    fn test_block_id_depends_on_nonce() {
        let block = Block::default();
        let mut other = block.clone();
        other.nonce = 1;
        assert_ne!(block.id(), other.id());
    }
}
