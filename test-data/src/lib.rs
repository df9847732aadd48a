//! Fixtures for building valid chains in tests.

mod chain_builder;

pub use crate::chain_builder::{BlockBuilder, ChainBuilder, TransactionBuilder};

use chain::{FileContract, Height, SiacoinOutput, UnlockHash};
use network::ConsensusParams;
use primitives::H256;

pub fn unlock_hash(n: u64) -> UnlockHash {
    UnlockHash::from(H256::from_low_u64_be(n))
}

pub fn miner_unlock_hash() -> UnlockHash {
    unlock_hash(0xffff)
}

/// A file contract whose payout splits validate at `creation_height`:
/// both outcome sets hold a single output worth the payout minus tax.
pub fn valid_file_contract(
    params: &ConsensusParams,
    creation_height: Height,
    start_height: Height,
    end_height: Height,
    payout: u64,
    beneficiary: UnlockHash,
) -> FileContract {
    let payout = chain::Currency::from(payout);
    let outcome = payout - params.tax(creation_height, &payout);
    FileContract {
        file_size: 0,
        file_merkle_root: H256::default(),
        start_height,
        end_height,
        payout,
        valid_proof_outputs: vec![SiacoinOutput {
            value: outcome,
            unlock_hash: beneficiary,
        }],
        missed_proof_outputs: vec![SiacoinOutput {
            value: outcome,
            unlock_hash: beneficiary,
        }],
        unlock_hash: beneficiary,
    }
}
