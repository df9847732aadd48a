use crate::diffs::{
    DelayedSiacoinOutputDiff, FileContractDiff, SiacoinOutputDiff, SiafundOutputDiff,
    SiafundPoolDiff,
};
use chain::{Block, BlockId, Height};
use primitives::H256;
use ser::{Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use std::io;

/// A block plus everything needed to apply and revert it.
///
/// The five diff lists are written during the block's first full
/// validation and are replayed verbatim afterwards; diffs are never
/// recomputed, so a revert inverts exactly the state transition that was
/// committed, even if validation logic changes between the two events.
/// List order is authoring order and must survive serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedBlock {
    pub block: Block,
    pub parent: BlockId,
    pub height: Height,
    pub diffs_generated: bool,
    /// Checksum of the full consensus state at the moment the diffs were
    /// generated. Reverting back onto this block recomputes the checksum
    /// and refuses to proceed on a mismatch.
    pub consensus_checksum: Option<H256>,
    pub siacoin_output_diffs: Vec<SiacoinOutputDiff>,
    pub file_contract_diffs: Vec<FileContractDiff>,
    pub siafund_output_diffs: Vec<SiafundOutputDiff>,
    pub delayed_siacoin_output_diffs: Vec<DelayedSiacoinOutputDiff>,
    pub siafund_pool_diffs: Vec<SiafundPoolDiff>,
}

impl ProcessedBlock {
    pub fn new(block: Block, height: Height) -> Self {
        ProcessedBlock {
            parent: block.parent_id,
            block,
            height,
            diffs_generated: false,
            consensus_checksum: None,
            siacoin_output_diffs: Vec::new(),
            file_contract_diffs: Vec::new(),
            siafund_output_diffs: Vec::new(),
            delayed_siacoin_output_diffs: Vec::new(),
            siafund_pool_diffs: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.block.id()
    }
}

impl Serializable for ProcessedBlock {
    fn serialize(&self, stream: &mut Stream) {
        stream
            .append(&self.block)
            .append(&self.parent)
            .append(&self.height)
            .append(&self.diffs_generated);
        match self.consensus_checksum {
            Some(ref checksum) => stream.append(&true).append(checksum),
            None => stream.append(&false),
        };
        stream
            .append_list(&self.siacoin_output_diffs)
            .append_list(&self.file_contract_diffs)
            .append_list(&self.siafund_output_diffs)
            .append_list(&self.delayed_siacoin_output_diffs)
            .append_list(&self.siafund_pool_diffs);
    }

    fn serialized_size(&self) -> usize {
        self.block.serialized_size()
            + 32
            + 8
            + 1
            + 1
            + self.consensus_checksum.map_or(0, |_| 32)
            + ser::serialized_list_size(&self.siacoin_output_diffs)
            + ser::serialized_list_size(&self.file_contract_diffs)
            + ser::serialized_list_size(&self.siafund_output_diffs)
            + ser::serialized_list_size(&self.delayed_siacoin_output_diffs)
            + ser::serialized_list_size(&self.siafund_pool_diffs)
    }
}

impl Deserializable for ProcessedBlock {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        let block = reader.read()?;
        let parent = reader.read()?;
        let height = reader.read()?;
        let diffs_generated = reader.read()?;
        let consensus_checksum = if reader.read::<bool>()? {
            Some(reader.read()?)
        } else {
            None
        };

        Ok(ProcessedBlock {
            block,
            parent,
            height,
            diffs_generated,
            consensus_checksum,
            siacoin_output_diffs: reader.read_list()?,
            file_contract_diffs: reader.read_list()?,
            siafund_output_diffs: reader.read_list()?,
            delayed_siacoin_output_diffs: reader.read_list()?,
            siafund_pool_diffs: reader.read_list()?,
        })
    }
}
