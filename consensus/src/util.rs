//! Shared helpers for the consensus tests.

use crate::apply_block::generate_and_apply_diffs;
use crate::error::Error;
use crate::fork::{fork_blockchain, ForkCapabilities};
use crate::traits::{
    AcceptAllProofs, AcceptAllSignatures, AlwaysValidHeaders, MemoryBadBlocks,
};
use chain::{Block, BlockId, Height};
use db::kv::MemoryDatabase;
use db::ConsensusDatabase;
use network::Network;
use primitives::H256;
use storage::{ConsensusStore, ConsensusView, DiffDirection, ProcessedBlock};
use test_data::ChainBuilder;

pub type TestDatabase = ConsensusDatabase<MemoryDatabase>;

pub fn regtest_db() -> (TestDatabase, ChainBuilder) {
    let chain = ChainBuilder::new(Network::Regtest);
    let db = ConsensusDatabase::open(MemoryDatabase::default(), chain.params().clone()).unwrap();
    (db, chain)
}

/// First-time integration of a block extending the tip.
pub fn apply_block(db: &TestDatabase, block: &Block, height: Height) -> Result<ProcessedBlock, Error> {
    let params = db.params().clone();
    db.in_transaction(|tx| {
        let mut pb = ProcessedBlock::new(block.clone(), height);
        generate_and_apply_diffs(tx, &mut pb, &params, &AcceptAllSignatures, &AcceptAllProofs)?;
        Ok(pb)
    })
}

/// Reverts the current tip block from its stored diffs.
pub fn revert_tip(db: &TestDatabase) -> Result<BlockId, Error> {
    db.in_transaction(|tx| {
        let tip = tx.best_block().id;
        let pb = tx.block(&tip)?.expect("the tip is always in the block map; qed");
        tx.commit_diff_set(&pb, DiffDirection::Revert)?;
        Ok(tip)
    })
}

/// Stores a fork block in the block map without applying it.
pub fn store_orphaned(db: &TestDatabase, block: &Block, height: Height) {
    db.in_transaction(|tx| tx.put_block(&ProcessedBlock::new(block.clone(), height)))
        .unwrap();
}

pub fn fork_to(
    db: &TestDatabase,
    block: &Block,
    height: Height,
    bad_blocks: &MemoryBadBlocks,
) -> Result<(Vec<BlockId>, Vec<BlockId>), Error> {
    let params = db.params().clone();
    db.in_transaction(|tx| {
        fork_blockchain(
            tx,
            ProcessedBlock::new(block.clone(), height),
            &params,
            &ForkCapabilities {
                headers: &AlwaysValidHeaders,
                signatures: &AcceptAllSignatures,
                proofs: &AcceptAllProofs,
                bad_blocks,
            },
        )
    })
}

pub fn checksum(db: &TestDatabase) -> H256 {
    db.read(|tx| tx.consensus_checksum()).unwrap()
}

/// Path invariant: every height up to the tip resolves to a generated
/// block whose parent sits one height below.
pub fn assert_path_consistent(db: &TestDatabase) {
    db.read(|tx| {
        let best = tx.best_block();
        let mut previous: Option<BlockId> = None;
        for height in 0..=best.height {
            let id = tx.block_path(height).unwrap().expect("path entry is missing");
            let pb = tx.block(&id).unwrap().expect("path entry has no block");
            assert_eq!(pb.height, height);
            assert!(pb.diffs_generated);
            if let Some(parent) = previous {
                assert_eq!(pb.parent, parent);
            }
            previous = Some(id);
        }
        assert_eq!(previous, Some(best.id));
    });
}
