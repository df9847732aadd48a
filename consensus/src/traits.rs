//! Capabilities consumed from outside the consensus core.

use chain::{Block, BlockId, FileContract, StorageProof, Transaction};
use parking_lot::RwLock;
use std::collections::HashSet;
use storage::ProcessedBlock;

/// Contextual header validity: proof of work against the child target,
/// timestamp bounds and difficulty retargeting. Retarget implementations
/// must read the time-passed and block-window accumulators from the outer
/// retarget scope; shadowed inner-scope copies silently zero the
/// adjustment.
pub trait HeaderValidator {
    fn valid_header(&self, parent: &ProcessedBlock, block: &Block) -> bool;
}

/// Cryptographic validity of all signatures carried by a transaction.
pub trait SignatureVerifier {
    fn valid_signatures(&self, tx: &Transaction) -> bool;
}

/// Cryptographic validity of a storage proof against its contract.
pub trait ProofVerifier {
    fn valid_proof(&self, contract: &FileContract, proof: &StorageProof) -> bool;
}

/// Write-only set of block ids that failed validation and must never be
/// reconsidered. Ownership is outside the consensus core; entries survive
/// the rollback of the transaction that produced them.
pub trait BadBlocks {
    fn insert(&self, id: &BlockId);
}

/// Accepts every header.
pub struct AlwaysValidHeaders;

impl HeaderValidator for AlwaysValidHeaders {
    fn valid_header(&self, _parent: &ProcessedBlock, _block: &Block) -> bool {
        true
    }
}

/// Accepts every signature set.
pub struct AcceptAllSignatures;

impl SignatureVerifier for AcceptAllSignatures {
    fn valid_signatures(&self, _tx: &Transaction) -> bool {
        true
    }
}

/// Accepts every storage proof.
pub struct AcceptAllProofs;

impl ProofVerifier for AcceptAllProofs {
    fn valid_proof(&self, _contract: &FileContract, _proof: &StorageProof) -> bool {
        true
    }
}

/// In-memory bad-block set.
#[derive(Default)]
pub struct MemoryBadBlocks {
    blocks: RwLock<HashSet<BlockId>>,
}

impl MemoryBadBlocks {
    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.read().contains(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl BadBlocks for MemoryBadBlocks {
    fn insert(&self, id: &BlockId) {
        self.blocks.write().insert(*id);
    }
}
