use crate::best_block::BestBlock;
use crate::diffs::{
    DelayedSiacoinOutputDiff, DiffDirection, FileContractDiff, SiacoinOutputDiff, SiafundOutputDiff,
    SiafundPoolDiff,
};
use crate::error::Error;
use crate::processed_block::ProcessedBlock;
use chain::{
    BlockId, Currency, FileContract, FileContractId, Height, SiacoinOutput, SiacoinOutputId,
    SiafundOutput, SiafundOutputId,
};
use primitives::H256;

/// Read access to the consensus state, as seen from inside the current
/// transaction: reads observe the transaction's own writes.
pub trait ConsensusView {
    /// The current tip. The database always holds at least the genesis
    /// block, so there is always one.
    fn best_block(&self) -> BestBlock;

    fn block_path(&self, height: Height) -> Result<Option<BlockId>, Error>;

    fn block(&self, id: &BlockId) -> Result<Option<ProcessedBlock>, Error>;

    fn siacoin_output(&self, id: &SiacoinOutputId) -> Result<Option<SiacoinOutput>, Error>;

    fn file_contract(&self, id: &FileContractId) -> Result<Option<FileContract>, Error>;

    fn siafund_output(&self, id: &SiafundOutputId) -> Result<Option<SiafundOutput>, Error>;

    fn siafund_pool(&self) -> Result<Currency, Error>;

    fn delayed_siacoin_output(
        &self,
        maturity_height: Height,
        id: &SiacoinOutputId,
    ) -> Result<Option<SiacoinOutput>, Error>;

    fn delayed_bucket_exists(&self, maturity_height: Height) -> Result<bool, Error>;

    /// Contents of the delayed bucket for the given maturity height,
    /// ordered by output id.
    fn delayed_siacoin_outputs(
        &self,
        maturity_height: Height,
    ) -> Result<Vec<(SiacoinOutputId, SiacoinOutput)>, Error>;

    /// Ids of the file contracts whose proof window ends at the given
    /// height, ordered by id.
    fn expiring_file_contracts(&self, height: Height) -> Result<Vec<FileContractId>, Error>;

    /// Deterministic hash of the entire consensus state.
    fn consensus_checksum(&self) -> Result<H256, Error>;
}

/// Mutation primitives over the consensus state. Everything here runs
/// inside one transaction; nothing is observable until that transaction
/// commits.
pub trait ConsensusStore: ConsensusView {
    fn put_block(&mut self, pb: &ProcessedBlock) -> Result<(), Error>;

    fn delete_block(&mut self, id: &BlockId) -> Result<(), Error>;

    /// Appends at the tip and advances it. The pushed block's parent must
    /// be the current tip.
    fn push_path(&mut self, id: &BlockId, parent: &BlockId) -> Result<(), Error>;

    /// Removes the tip entry and steps the tip back. Popping the genesis
    /// block is refused.
    fn pop_path(&mut self) -> Result<BlockId, Error>;

    fn create_delayed_bucket(&mut self, maturity_height: Height) -> Result<(), Error>;

    /// The bucket must exist and be empty.
    fn delete_delayed_bucket(&mut self, maturity_height: Height) -> Result<(), Error>;

    fn commit_siacoin_output_diff(
        &mut self,
        diff: &SiacoinOutputDiff,
        direction: DiffDirection,
    ) -> Result<(), Error>;

    fn commit_file_contract_diff(
        &mut self,
        diff: &FileContractDiff,
        direction: DiffDirection,
    ) -> Result<(), Error>;

    fn commit_siafund_output_diff(
        &mut self,
        diff: &SiafundOutputDiff,
        direction: DiffDirection,
    ) -> Result<(), Error>;

    fn commit_delayed_siacoin_output_diff(
        &mut self,
        diff: &DelayedSiacoinOutputDiff,
        direction: DiffDirection,
    ) -> Result<(), Error>;

    fn commit_siafund_pool_diff(
        &mut self,
        diff: &SiafundPoolDiff,
        direction: DiffDirection,
    ) -> Result<(), Error>;

    /// Applies or reverts a processed block's entire diff collection,
    /// including delayed-bucket lifecycle and the path update.
    fn commit_diff_set(
        &mut self,
        pb: &ProcessedBlock,
        direction: DiffDirection,
    ) -> Result<(), Error>;
}
