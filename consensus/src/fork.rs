use crate::apply_block::generate_and_apply_diffs;
use crate::error::Error;
use crate::traits::{BadBlocks, HeaderValidator, ProofVerifier, SignatureVerifier};
use chain::BlockId;
use network::ConsensusParams;
use storage::{ConsensusStore, DiffDirection, ProcessedBlock};

/// Forks longer than this are refused outright.
const MAX_FORK_ROUTE_PRESET: usize = 2048;

/// Capabilities the reorganization coordinator consumes.
pub struct ForkCapabilities<'a> {
    pub headers: &'a dyn HeaderValidator,
    pub signatures: &'a dyn SignatureVerifier,
    pub proofs: &'a dyn ProofVerifier,
    pub bad_blocks: &'a dyn BadBlocks,
}

/// Makes the chain ending in `new_pb` the best chain.
///
/// The caller has already decided that the new chain carries enough
/// cumulative work to surpass the current one; this routine only moves the
/// state over. It walks parent links back to the fork point, reverts the
/// current chain onto it and applies the fork blocks oldest first. Blocks
/// visited for the first time are validated as they are applied; blocks
/// with stored diffs are replayed.
///
/// If a fork block fails validation, the partially adopted fork is
/// rewound, the entire forward history is marked bad, the original chain
/// is re-applied and the validation error is surfaced. The enclosing
/// store transaction then rolls back, so nothing of the attempt persists.
///
/// Returns the reverted block ids (tip first) and the applied block ids
/// (oldest first).
pub fn fork_blockchain<S>(
    store: &mut S,
    new_pb: ProcessedBlock,
    params: &ConsensusParams,
    caps: &ForkCapabilities,
) -> Result<(Vec<BlockId>, Vec<BlockId>), Error>
where
    S: ConsensusStore,
{
    let parent = store
        .block(&new_pb.parent)?
        .ok_or(Error::UnknownParent)?;
    if new_pb.height != parent.height + 1 {
        return Err(Error::InvalidHeader);
    }
    if store.block(&new_pb.id())?.is_none() {
        store.put_block(&new_pb)?;
    }

    // child-first ancestry down to the first ancestor on the current path
    let mut parent_history = Vec::new();
    let mut cursor = new_pb;
    loop {
        if store.block_path(cursor.height)? == Some(cursor.id()) {
            break;
        }
        if parent_history.len() >= MAX_FORK_ROUTE_PRESET {
            return Err(Error::AncientFork);
        }
        let parent_id = cursor.parent;
        parent_history.push(cursor);
        cursor = store.block(&parent_id)?.ok_or(Error::UnknownParent)?;
    }
    let fork_point = cursor;

    // a block already on the best chain moves nothing
    if parent_history.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    trace!(
        target: "reorg",
        "fork point {} at height {}, {} blocks to apply",
        fork_point.id(),
        fork_point.height,
        parent_history.len(),
    );

    // rewind the current chain onto the fork point
    let mut reverted = Vec::new();
    while store.best_block().id != fork_point.id() {
        let tip = store
            .block(&store.best_block().id)?
            .ok_or(storage::Error::Corrupt)?;
        store.commit_diff_set(&tip, DiffDirection::Revert)?;
        reverted.push(tip);
    }

    // forward through the fork, oldest first; each step validates the
    // block it is about to apply, never the block that started the fork
    let mut applied: Vec<ProcessedBlock> = Vec::new();
    for pb in parent_history.iter().rev() {
        match apply_next(store, &pb.id(), params, caps) {
            Ok(applied_pb) => applied.push(applied_pb),
            Err(err) => {
                if err.is_fatal() {
                    return Err(err);
                }
                error!(
                    target: "reorg",
                    "block {} on the new fork is invalid, restoring the original chain: {}",
                    pb.id(),
                    err,
                );
                recover_original_chain(store, &parent_history, &applied, &reverted, caps)?;
                return Err(err);
            }
        }
    }

    trace!(
        target: "reorg",
        "new tip {} at height {}",
        store.best_block().id,
        store.best_block().height,
    );

    Ok((
        reverted.iter().map(ProcessedBlock::id).collect(),
        applied.iter().map(ProcessedBlock::id).collect(),
    ))
}

fn apply_next<S>(
    store: &mut S,
    id: &BlockId,
    params: &ConsensusParams,
    caps: &ForkCapabilities,
) -> Result<ProcessedBlock, Error>
where
    S: ConsensusStore,
{
    // reload from the block map: an earlier visit may have stored
    // generated diffs for this block
    let mut pb = store.block(id)?.ok_or(storage::Error::UnknownBlock)?;

    if pb.diffs_generated {
        store.commit_diff_set(&pb, DiffDirection::Apply)?;
    } else {
        let parent = store.block(&pb.parent)?.ok_or(Error::UnknownParent)?;
        if !caps.headers.valid_header(&parent, &pb.block) {
            return Err(Error::InvalidHeader);
        }
        generate_and_apply_diffs(store, &mut pb, params, caps.signatures, caps.proofs)?;
    }

    Ok(pb)
}

/// Undoes a partially adopted fork and puts the original chain back.
/// The original blocks replay from their stored diffs and cannot fail; if
/// they do anyway, the database is corrupt and the error says so.
fn recover_original_chain<S>(
    store: &mut S,
    parent_history: &[ProcessedBlock],
    applied: &[ProcessedBlock],
    reverted: &[ProcessedBlock],
    caps: &ForkCapabilities,
) -> Result<(), Error>
where
    S: ConsensusStore,
{
    for pb in applied.iter().rev() {
        store
            .commit_diff_set(pb, DiffDirection::Revert)
            .map_err(|_| Error::ReorgRollbackFailed)?;
    }

    for pb in parent_history {
        caps.bad_blocks.insert(&pb.id());
        store
            .delete_block(&pb.id())
            .map_err(|_| Error::ReorgRollbackFailed)?;
    }

    for pb in reverted.iter().rev() {
        store
            .commit_diff_set(pb, DiffDirection::Apply)
            .map_err(|_| Error::ReorgRollbackFailed)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::{Error, TransactionError};
    use crate::traits::MemoryBadBlocks;
    use crate::util::{
        apply_block, assert_path_consistent, checksum, fork_to, regtest_db, store_orphaned,
    };
    use chain::{Block, Currency, SiacoinOutput};
    use storage::ConsensusView;
    use test_data::{unlock_hash, ChainBuilder, TransactionBuilder};

    /// Five applied blocks on the main chain.
    fn base_chain() -> (crate::util::TestDatabase, ChainBuilder, Vec<Block>) {
        let (db, mut chain) = regtest_db();
        let mut blocks = Vec::new();
        for height in 1..=5u64 {
            let block = chain.block().build();
            apply_block(&db, &block, height).unwrap();
            chain.advance(&block);
            blocks.push(block);
        }
        (db, chain, blocks)
    }

    #[test]
    fn test_fork_extends_tip() {
        let (db, chain) = regtest_db();
        let bad_blocks = MemoryBadBlocks::default();
        let block = chain.block().build();

        let (reverted, applied) = fork_to(&db, &block, 1, &bad_blocks).unwrap();

        assert!(reverted.is_empty());
        assert_eq!(applied, vec![block.id()]);
        assert_eq!(db.best_block().id, block.id());
        assert!(bad_blocks.is_empty());
    }

    #[test]
    fn test_fork_refuses_unknown_parent() {
        let (db, chain) = regtest_db();
        let bad_blocks = MemoryBadBlocks::default();
        let orphan = chain.block_on(unlock_hash(99).0.into(), 4).build();
        assert_eq!(
            fork_to(&db, &orphan, 4, &bad_blocks).unwrap_err(),
            Error::UnknownParent
        );
    }

    #[test]
    fn test_reorganization_switches_chains() {
        let (db, chain, a_blocks) = base_chain();
        let before = checksum(&db);
        let bad_blocks = MemoryBadBlocks::default();

        // heavier chain branching off after height three
        let b4 = chain.block_on(a_blocks[2].id(), 4).with_nonce(1).build();
        let b5 = chain.block_on(b4.id(), 5).with_nonce(1).build();
        let b6 = chain.block_on(b5.id(), 6).with_nonce(1).build();
        store_orphaned(&db, &b4, 4);
        store_orphaned(&db, &b5, 5);

        let (reverted, applied) = fork_to(&db, &b6, 6, &bad_blocks).unwrap();

        // the old tip goes first
        assert_eq!(reverted, vec![a_blocks[4].id(), a_blocks[3].id()]);
        assert_eq!(applied, vec![b4.id(), b5.id(), b6.id()]);
        assert_eq!(db.best_block().id, b6.id());
        assert_eq!(db.best_block().height, 6);
        db.read(|view| {
            assert_eq!(view.block_path(3).unwrap(), Some(a_blocks[2].id()));
            assert_eq!(view.block_path(4).unwrap(), Some(b4.id()));
        });
        assert_path_consistent(&db);
        assert!(bad_blocks.is_empty());

        // walking back to the original tip restores the exact state
        let (reverted, applied) = fork_to(&db, &a_blocks[4], 5, &bad_blocks).unwrap();
        assert_eq!(reverted.len(), 3);
        assert_eq!(applied, vec![a_blocks[3].id(), a_blocks[4].id()]);
        assert_eq!(db.best_block().id, a_blocks[4].id());
        assert_eq!(checksum(&db), before);
        assert_path_consistent(&db);
    }

    #[test]
    fn test_failed_reorganization_restores_original_chain() {
        let (db, chain, a_blocks) = base_chain();
        let before = checksum(&db);
        let bad_blocks = MemoryBadBlocks::default();

        let b4 = chain.block_on(a_blocks[2].id(), 4).with_nonce(1).build();
        // block five spends an output that does not exist
        let missing = SiacoinOutput {
            value: Currency::from(50u64),
            unlock_hash: unlock_hash(9),
        };
        let invalid = TransactionBuilder::new()
            .spend(unlock_hash(98).0.into(), &missing)
            .add_output(50, unlock_hash(9))
            .build();
        let b5 = chain
            .block_on(b4.id(), 5)
            .with_nonce(1)
            .with_transaction(invalid)
            .build();
        let b6 = chain.block_on(b5.id(), 6).with_nonce(1).build();
        store_orphaned(&db, &b4, 4);
        store_orphaned(&db, &b5, 5);

        let result = fork_to(&db, &b6, 6, &bad_blocks);
        assert_eq!(
            result.unwrap_err(),
            Error::Transaction(0, TransactionError::MissingSiacoinOutput)
        );

        // the original chain is live again and byte-identical
        assert_eq!(db.best_block().id, a_blocks[4].id());
        assert_eq!(db.best_block().height, 5);
        assert_eq!(checksum(&db), before);
        assert_path_consistent(&db);

        // the whole forward history is poisoned
        assert_eq!(bad_blocks.len(), 3);
        assert!(bad_blocks.contains(&b4.id()));
        assert!(bad_blocks.contains(&b5.id()));
        assert!(bad_blocks.contains(&b6.id()));
    }

    #[test]
    fn test_reorganization_carries_spends_across_chains() {
        let (db, chain) = regtest_db();
        let bad_blocks = MemoryBadBlocks::default();
        let (spent_id, spent_output) = chain.genesis_siacoin_outputs()[0].clone();

        // chain A spends the output at height one
        let spend_a = TransactionBuilder::new()
            .spend(spent_id, &spent_output)
            .add_output(100, unlock_hash(3))
            .build();
        let a1 = chain.block().with_transaction(spend_a).build();
        apply_block(&db, &a1, 1).unwrap();

        // chain B spends the same output differently, two blocks deep
        let spend_b = TransactionBuilder::new()
            .spend(spent_id, &spent_output)
            .add_output(100, unlock_hash(4))
            .build();
        let b1 = chain
            .block()
            .with_nonce(1)
            .with_transaction(spend_b.clone())
            .build();
        let b2 = chain.block_on(b1.id(), 2).with_nonce(1).build();
        store_orphaned(&db, &b1, 1);

        fork_to(&db, &b2, 2, &bad_blocks).unwrap();

        db.read(|view| {
            // the output exists under B's spend, not A's
            assert!(view.siacoin_output(&spend_b.siacoin_output_id(0)).unwrap().is_some());
            assert!(view.siacoin_output(&spend_a.siacoin_output_id(0)).unwrap().is_none());
            assert!(view.siacoin_output(&spent_id).unwrap().is_none());
        });
    }
}
