mod best_block;
mod diffs;
mod error;
mod processed_block;
mod store;

pub use primitives::{bytes, hash};

pub use crate::best_block::BestBlock;
pub use crate::diffs::{
    DelayedSiacoinOutputDiff, DiffDirection, FileContractDiff, SiacoinOutputDiff, SiafundOutputDiff,
    SiafundPoolDiff,
};
pub use crate::error::Error;
pub use crate::processed_block::ProcessedBlock;
pub use crate::store::{ConsensusStore, ConsensusView};
