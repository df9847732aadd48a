use crate::kv::{
    Key, KeyValue, KeyValueDatabase, OverlayDatabase, Transaction, Value,
    COL_BLOCK_PATH, COL_DELAYED_OUTPUTS, COL_FILE_CONTRACTS, COL_FILE_CONTRACT_EXPIRATIONS,
    COL_SIACOIN_OUTPUTS, COL_SIAFUND_OUTPUTS, COL_SIAFUND_POOL,
};
use chain::{
    BlockId, Currency, FileContract, FileContractId, Height, SiacoinOutput, SiacoinOutputId,
    SiafundOutput, SiafundOutputId,
};
use crypto::Hasher;
use network::ConsensusParams;
use parking_lot::{Mutex, RwLock};
use primitives::H256;
use ser::{deserialize, serialize};
use storage::{
    BestBlock, ConsensusStore, ConsensusView, DelayedSiacoinOutputDiff, DiffDirection, Error,
    FileContractDiff, ProcessedBlock, SiacoinOutputDiff, SiafundOutputDiff, SiafundPoolDiff,
};

const KEY_BEST_BLOCK_NUMBER: &str = "best_block_number";
const KEY_BEST_BLOCK_HASH: &str = "best_block_hash";

/// Columns covered by the consensus checksum. The block map is excluded:
/// processed blocks embed checksums themselves.
const CHECKSUM_COLUMNS: [u32; 6] = [
    COL_BLOCK_PATH,
    COL_SIACOIN_OUTPUTS,
    COL_FILE_CONTRACTS,
    COL_SIAFUND_OUTPUTS,
    COL_SIAFUND_POOL,
    COL_DELAYED_OUTPUTS,
];

/// Consensus state in typed buckets over a key-value store.
///
/// All mutation goes through [`ConsensusDatabase::in_transaction`]. The
/// closure works against an overlay; returning `Ok` flushes the overlay as
/// one atomic write, any other exit discards it. An empty database is
/// seeded with the genesis block on open.
pub struct ConsensusDatabase<T>
where
    T: KeyValueDatabase,
{
    db: T,
    params: ConsensusParams,
    best_block: RwLock<BestBlock>,
    write_lock: Mutex<()>,
}

impl<T> ConsensusDatabase<T>
where
    T: KeyValueDatabase,
{
    pub fn open(db: T, params: ConsensusParams) -> Result<Self, Error> {
        let best_block = Self::read_best_block(&db)?;
        let database = ConsensusDatabase {
            db,
            params,
            best_block: RwLock::new(best_block.unwrap_or_default()),
            write_lock: Mutex::new(()),
        };

        if best_block.is_none() {
            trace!(target: "db", "empty database, seeding genesis state");
            database.in_transaction(|tx| tx.initialize_genesis())?;
        }

        Ok(database)
    }

    fn read_best_block(db: &T) -> Result<Option<BestBlock>, Error> {
        let number = db
            .get(&Key::Meta(KEY_BEST_BLOCK_NUMBER))
            .map_err(Error::Database)?
            .into_option()
            .and_then(Value::as_meta);
        let hash = db
            .get(&Key::Meta(KEY_BEST_BLOCK_HASH))
            .map_err(Error::Database)?
            .into_option()
            .and_then(Value::as_meta);

        match (number, hash) {
            (None, None) => Ok(None),
            (Some(number), Some(hash)) => Ok(Some(BestBlock {
                height: deserialize(&number)?,
                id: deserialize(&hash)?,
            })),
            _ => Err(Error::Corrupt),
        }
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// The current tip, as of the last committed transaction.
    pub fn best_block(&self) -> BestBlock {
        *self.best_block.read()
    }

    /// Runs `f` inside a read-write transaction. The commit path is
    /// serialized; there is never more than one live writer.
    pub fn in_transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut StoreTransaction<T>) -> Result<R, E>,
        E: From<Error>,
    {
        let _guard = self.write_lock.lock();
        let mut tx = StoreTransaction::new(&self.db, &self.params, *self.best_block.read());
        let result = f(&mut tx)?;
        let best_block = tx.best_block();
        tx.commit().map_err(E::from)?;
        *self.best_block.write() = best_block;
        Ok(result)
    }

    /// Runs `f` against a read-only view of the committed state.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&StoreTransaction<T>) -> R,
    {
        let tx = StoreTransaction::new(&self.db, &self.params, *self.best_block.read());
        f(&tx)
    }
}

/// A read-write transaction over the consensus database.
///
/// Reads observe the transaction's own writes. Nothing is persisted until
/// the enclosing `in_transaction` closure returns `Ok`.
pub struct StoreTransaction<'a, T>
where
    T: KeyValueDatabase,
{
    overlay: OverlayDatabase<'a, T>,
    params: &'a ConsensusParams,
    best: BestBlock,
}

impl<'a, T> StoreTransaction<'a, T>
where
    T: KeyValueDatabase,
{
    fn new(db: &'a T, params: &'a ConsensusParams, best: BestBlock) -> Self {
        StoreTransaction {
            overlay: OverlayDatabase::new(db),
            params,
            best,
        }
    }

    fn commit(self) -> Result<(), Error> {
        self.overlay.flush().map_err(Error::Database)
    }

    fn get(&self, key: &Key) -> Result<Option<Value>, Error> {
        Ok(self.overlay.get(key).map_err(Error::Database)?.into_option())
    }

    fn contains(&self, key: &Key) -> Result<bool, Error> {
        self.get(key).map(|value| value.is_some())
    }

    fn insert(&mut self, insert: KeyValue) -> Result<(), Error> {
        let mut tx = Transaction::new();
        tx.insert(insert);
        self.overlay.write(tx).map_err(Error::Database)
    }

    fn delete(&mut self, delete: Key) -> Result<(), Error> {
        let mut tx = Transaction::new();
        tx.delete(delete);
        self.overlay.write(tx).map_err(Error::Database)
    }

    fn set_best(&mut self, best: BestBlock) -> Result<(), Error> {
        self.insert(KeyValue::Meta(KEY_BEST_BLOCK_NUMBER, serialize(&best.height)))?;
        self.insert(KeyValue::Meta(KEY_BEST_BLOCK_HASH, serialize(&best.id)))?;
        self.best = best;
        Ok(())
    }

    fn add_siacoin_output(
        &mut self,
        id: SiacoinOutputId,
        output: &SiacoinOutput,
    ) -> Result<(), Error> {
        if self.contains(&Key::SiacoinOutput(id))? {
            return Err(Error::ExistingSiacoinOutput);
        }
        self.insert(KeyValue::SiacoinOutput(id, output.clone()))
    }

    fn remove_siacoin_output(&mut self, id: SiacoinOutputId) -> Result<(), Error> {
        if !self.contains(&Key::SiacoinOutput(id))? {
            return Err(Error::MissingSiacoinOutput);
        }
        self.delete(Key::SiacoinOutput(id))
    }

    fn add_file_contract(
        &mut self,
        id: FileContractId,
        contract: &FileContract,
    ) -> Result<(), Error> {
        if self.contains(&Key::FileContract(id))? {
            return Err(Error::ExistingFileContract);
        }
        self.insert(KeyValue::FileContract(id, contract.clone()))?;
        // expiration index entries live and die with the contract
        self.insert(KeyValue::FileContractExpiration(contract.end_height, id))
    }

    fn remove_file_contract(&mut self, id: FileContractId) -> Result<(), Error> {
        let contract = match self.file_contract(&id)? {
            Some(contract) => contract,
            None => {
                return Err(Error::MissingFileContract);
            }
        };
        self.delete(Key::FileContract(id))?;
        self.delete(Key::FileContractExpiration(contract.end_height, id))
    }

    fn add_siafund_output(
        &mut self,
        id: SiafundOutputId,
        output: &SiafundOutput,
    ) -> Result<(), Error> {
        if self.contains(&Key::SiafundOutput(id))? {
            return Err(Error::ExistingSiafundOutput);
        }
        self.insert(KeyValue::SiafundOutput(id, output.clone()))
    }

    fn remove_siafund_output(&mut self, id: SiafundOutputId) -> Result<(), Error> {
        if !self.contains(&Key::SiafundOutput(id))? {
            return Err(Error::MissingSiafundOutput);
        }
        self.delete(Key::SiafundOutput(id))
    }

    fn add_delayed_output(
        &mut self,
        maturity_height: Height,
        id: SiacoinOutputId,
        output: &SiacoinOutput,
    ) -> Result<(), Error> {
        if !self.delayed_bucket_exists(maturity_height)? {
            return Err(Error::BucketMissing);
        }
        if self.contains(&Key::DelayedOutput(maturity_height, id))? {
            return Err(Error::ExistingDelayedOutput);
        }
        self.insert(KeyValue::DelayedOutput(maturity_height, id, output.clone()))
    }

    fn remove_delayed_output(
        &mut self,
        maturity_height: Height,
        id: SiacoinOutputId,
    ) -> Result<(), Error> {
        if !self.contains(&Key::DelayedOutput(maturity_height, id))? {
            return Err(Error::MissingDelayedOutput);
        }
        self.delete(Key::DelayedOutput(maturity_height, id))
    }

    fn set_siafund_pool(&mut self, pool: Currency) -> Result<(), Error> {
        self.insert(KeyValue::SiafundPool(pool))
    }

    fn commit_sanity(&self, pb: &ProcessedBlock, direction: DiffDirection) -> Result<(), Error> {
        if !pb.diffs_generated {
            error!(target: "db", "refusing to commit block {} without generated diffs", pb.id());
            return Err(Error::DiffsNotGenerated);
        }

        let best = self.best;
        match direction {
            DiffDirection::Apply if pb.parent != best.id => {
                error!(
                    target: "db",
                    "cannot apply block {}: parent {} is not the current block {}",
                    pb.id(),
                    pb.parent,
                    best.id,
                );
                Err(Error::WrongAppliedBlock)
            }
            DiffDirection::Revert if pb.id() != best.id => {
                error!(
                    target: "db",
                    "cannot revert block {}: current block is {}",
                    pb.id(),
                    best.id,
                );
                Err(Error::WrongRevertedBlock)
            }
            _ => Ok(()),
        }
    }

    /// After stepping the tip back, checks the recomputed state checksum
    /// against the one stored when the new tip's diffs were generated.
    fn verify_revert_checksum(&self) -> Result<(), Error> {
        let tip = self.block(&self.best.id)?.ok_or(Error::Corrupt)?;
        if let Some(expected) = tip.consensus_checksum {
            let actual = self.consensus_checksum()?;
            if actual != expected {
                error!(
                    target: "db",
                    "consensus checksum mismatch after revert to {}",
                    self.best.id,
                );
                return Err(Error::ChecksumMismatch);
            }
        }
        Ok(())
    }

    /// Seeds an empty database: the genesis allocation, path entry zero
    /// and an all-zero siafund pool. The genesis processed block gets a
    /// proper diff set so it takes part in checksum verification like any
    /// other block.
    pub(crate) fn initialize_genesis(&mut self) -> Result<(), Error> {
        let genesis = self.params.genesis_block().clone();
        let genesis_id = genesis.id();
        let mut pb = ProcessedBlock::new(genesis, 0);

        self.set_siafund_pool(Currency::zero())?;
        self.insert(KeyValue::BlockPath(0, genesis_id))?;
        self.set_best(BestBlock {
            height: 0,
            id: genesis_id,
        })?;

        let transactions = pb.block.transactions.clone();
        for tx in &transactions {
            for (index, output) in tx.siacoin_outputs.iter().enumerate() {
                let diff = SiacoinOutputDiff {
                    direction: DiffDirection::Apply,
                    id: tx.siacoin_output_id(index as u64),
                    siacoin_output: output.clone(),
                };
                self.commit_siacoin_output_diff(&diff, DiffDirection::Apply)?;
                pb.siacoin_output_diffs.push(diff);
            }
            for (index, output) in tx.siafund_outputs.iter().enumerate() {
                let mut output = output.clone();
                output.claim_start = Currency::zero();
                let diff = SiafundOutputDiff {
                    direction: DiffDirection::Apply,
                    id: tx.siafund_output_id(index as u64),
                    siafund_output: output,
                };
                self.commit_siafund_output_diff(&diff, DiffDirection::Apply)?;
                pb.siafund_output_diffs.push(diff);
            }
        }

        pb.consensus_checksum = Some(self.consensus_checksum()?);
        pb.diffs_generated = true;
        self.put_block(&pb)?;

        trace!(target: "db", "seeded genesis block {}", genesis_id);
        Ok(())
    }
}

impl<'a, T> ConsensusView for StoreTransaction<'a, T>
where
    T: KeyValueDatabase,
{
    fn best_block(&self) -> BestBlock {
        self.best
    }

    fn block_path(&self, height: Height) -> Result<Option<BlockId>, Error> {
        Ok(self
            .get(&Key::BlockPath(height))?
            .and_then(Value::as_block_path))
    }

    fn block(&self, id: &BlockId) -> Result<Option<ProcessedBlock>, Error> {
        Ok(self.get(&Key::Block(*id))?.and_then(Value::as_block))
    }

    fn siacoin_output(&self, id: &SiacoinOutputId) -> Result<Option<SiacoinOutput>, Error> {
        Ok(self
            .get(&Key::SiacoinOutput(*id))?
            .and_then(Value::as_siacoin_output))
    }

    fn file_contract(&self, id: &FileContractId) -> Result<Option<FileContract>, Error> {
        Ok(self
            .get(&Key::FileContract(*id))?
            .and_then(Value::as_file_contract))
    }

    fn siafund_output(&self, id: &SiafundOutputId) -> Result<Option<SiafundOutput>, Error> {
        Ok(self
            .get(&Key::SiafundOutput(*id))?
            .and_then(Value::as_siafund_output))
    }

    fn siafund_pool(&self) -> Result<Currency, Error> {
        self.get(&Key::SiafundPool)?
            .and_then(Value::as_siafund_pool)
            .ok_or(Error::Corrupt)
    }

    fn delayed_siacoin_output(
        &self,
        maturity_height: Height,
        id: &SiacoinOutputId,
    ) -> Result<Option<SiacoinOutput>, Error> {
        Ok(self
            .get(&Key::DelayedOutput(maturity_height, *id))?
            .and_then(Value::as_delayed_output))
    }

    fn delayed_bucket_exists(&self, maturity_height: Height) -> Result<bool, Error> {
        self.contains(&Key::DelayedBucket(maturity_height))
    }

    fn delayed_siacoin_outputs(
        &self,
        maturity_height: Height,
    ) -> Result<Vec<(SiacoinOutputId, SiacoinOutput)>, Error> {
        let prefix = maturity_height.to_be_bytes();
        let mut outputs = Vec::new();
        for (key, value) in self
            .overlay
            .iter(COL_DELAYED_OUTPUTS, &prefix)
            .map_err(Error::Database)?
        {
            if key.len() == prefix.len() {
                // bucket marker
                continue;
            }
            if key.len() != prefix.len() + 32 {
                return Err(Error::Corrupt);
            }
            let id = SiacoinOutputId::from(H256::from(&key[prefix.len()..]));
            outputs.push((id, deserialize(&value)?));
        }
        Ok(outputs)
    }

    fn expiring_file_contracts(&self, height: Height) -> Result<Vec<FileContractId>, Error> {
        let prefix = height.to_be_bytes();
        let mut contracts = Vec::new();
        for (key, _) in self
            .overlay
            .iter(COL_FILE_CONTRACT_EXPIRATIONS, &prefix)
            .map_err(Error::Database)?
        {
            if key.len() != prefix.len() + 32 {
                return Err(Error::Corrupt);
            }
            contracts.push(FileContractId::from(H256::from(&key[prefix.len()..])));
        }
        Ok(contracts)
    }

    fn consensus_checksum(&self) -> Result<H256, Error> {
        let mut hasher = Hasher::default();
        for location in &CHECKSUM_COLUMNS {
            hasher.update(&[*location as u8]);
            for (key, value) in self
                .overlay
                .iter(*location, &[])
                .map_err(Error::Database)?
            {
                hasher.update(&(key.len() as u64).to_le_bytes());
                hasher.update(&key);
                hasher.update(&(value.len() as u64).to_le_bytes());
                hasher.update(&value);
            }
        }
        Ok(hasher.finalize())
    }
}

impl<'a, T> ConsensusStore for StoreTransaction<'a, T>
where
    T: KeyValueDatabase,
{
    fn put_block(&mut self, pb: &ProcessedBlock) -> Result<(), Error> {
        self.insert(KeyValue::Block(pb.id(), pb.clone()))
    }

    fn delete_block(&mut self, id: &BlockId) -> Result<(), Error> {
        self.delete(Key::Block(*id))
    }

    fn push_path(&mut self, id: &BlockId, parent: &BlockId) -> Result<(), Error> {
        let best = self.best;
        if best.id != *parent {
            error!(
                target: "db",
                "cannot push {} onto the path: parent {} is not the tip {}",
                id,
                parent,
                best.id,
            );
            return Err(Error::WrongAppliedBlock);
        }

        let height = best.height + 1;
        self.insert(KeyValue::BlockPath(height, *id))?;
        self.set_best(BestBlock { height, id: *id })
    }

    fn pop_path(&mut self) -> Result<BlockId, Error> {
        let best = self.best;
        if best.height == 0 {
            return Err(Error::PathUnderflow);
        }

        self.delete(Key::BlockPath(best.height))?;
        let parent_height = best.height - 1;
        let parent = self.block_path(parent_height)?.ok_or(Error::Corrupt)?;
        self.set_best(BestBlock {
            height: parent_height,
            id: parent,
        })?;
        Ok(best.id)
    }

    fn create_delayed_bucket(&mut self, maturity_height: Height) -> Result<(), Error> {
        if self.delayed_bucket_exists(maturity_height)? {
            return Err(Error::BucketExists);
        }
        self.insert(KeyValue::DelayedBucket(maturity_height))
    }

    fn delete_delayed_bucket(&mut self, maturity_height: Height) -> Result<(), Error> {
        if !self.delayed_bucket_exists(maturity_height)? {
            return Err(Error::BucketMissing);
        }
        if cfg!(debug_assertions) {
            let contents = self.delayed_siacoin_outputs(maturity_height)?;
            assert!(
                contents.is_empty(),
                "deleting delayed bucket {} which still holds {} outputs",
                maturity_height,
                contents.len(),
            );
        }
        self.delete(Key::DelayedBucket(maturity_height))
    }

    fn commit_siacoin_output_diff(
        &mut self,
        diff: &SiacoinOutputDiff,
        direction: DiffDirection,
    ) -> Result<(), Error> {
        if diff.direction == direction {
            self.add_siacoin_output(diff.id, &diff.siacoin_output)
        } else {
            self.remove_siacoin_output(diff.id)
        }
    }

    fn commit_file_contract_diff(
        &mut self,
        diff: &FileContractDiff,
        direction: DiffDirection,
    ) -> Result<(), Error> {
        if diff.direction == direction {
            self.add_file_contract(diff.id, &diff.file_contract)
        } else {
            self.remove_file_contract(diff.id)
        }
    }

    fn commit_siafund_output_diff(
        &mut self,
        diff: &SiafundOutputDiff,
        direction: DiffDirection,
    ) -> Result<(), Error> {
        if diff.direction == direction {
            self.add_siafund_output(diff.id, &diff.siafund_output)
        } else {
            self.remove_siafund_output(diff.id)
        }
    }

    fn commit_delayed_siacoin_output_diff(
        &mut self,
        diff: &DelayedSiacoinOutputDiff,
        direction: DiffDirection,
    ) -> Result<(), Error> {
        if diff.direction == direction {
            self.add_delayed_output(diff.maturity_height, diff.id, &diff.siacoin_output)
        } else {
            self.remove_delayed_output(diff.maturity_height, diff.id)
        }
    }

    fn commit_siafund_pool_diff(
        &mut self,
        diff: &SiafundPoolDiff,
        direction: DiffDirection,
    ) -> Result<(), Error> {
        if diff.direction != DiffDirection::Apply {
            return Err(Error::NonApplyPoolDiff);
        }
        if diff.adjusted < diff.previous {
            return Err(Error::ShrinkingSiafundPool);
        }

        let pool = self.siafund_pool()?;
        match direction {
            DiffDirection::Apply => {
                if pool != diff.previous {
                    error!(
                        target: "db",
                        "siafund pool is {} but the diff expects {}",
                        pool,
                        diff.previous,
                    );
                    return Err(Error::SiafundPoolImbalance);
                }
                self.set_siafund_pool(diff.adjusted)
            }
            DiffDirection::Revert => {
                if pool != diff.adjusted {
                    error!(
                        target: "db",
                        "siafund pool is {} but the diff expects {}",
                        pool,
                        diff.adjusted,
                    );
                    return Err(Error::SiafundPoolImbalance);
                }
                self.set_siafund_pool(diff.previous)
            }
        }
    }

    fn commit_diff_set(
        &mut self,
        pb: &ProcessedBlock,
        direction: DiffDirection,
    ) -> Result<(), Error> {
        self.commit_sanity(pb, direction)?;

        let maturity_delay = self.params.maturity_delay;

        // the bucket receiving this commit's delayed outputs must exist
        // before any diff is committed
        match direction {
            DiffDirection::Apply => {
                self.create_delayed_bucket(pb.height + maturity_delay)?;
            }
            DiffDirection::Revert => {
                if pb.height > maturity_delay {
                    self.create_delayed_bucket(pb.height)?;
                }
            }
        }

        match direction {
            DiffDirection::Apply => {
                for diff in &pb.siacoin_output_diffs {
                    self.commit_siacoin_output_diff(diff, direction)?;
                }
                for diff in &pb.file_contract_diffs {
                    self.commit_file_contract_diff(diff, direction)?;
                }
                for diff in &pb.siafund_output_diffs {
                    self.commit_siafund_output_diff(diff, direction)?;
                }
                for diff in &pb.delayed_siacoin_output_diffs {
                    self.commit_delayed_siacoin_output_diff(diff, direction)?;
                }
                for diff in &pb.siafund_pool_diffs {
                    self.commit_siafund_pool_diff(diff, direction)?;
                }
            }
            DiffDirection::Revert => {
                for diff in pb.siacoin_output_diffs.iter().rev() {
                    self.commit_siacoin_output_diff(diff, direction)?;
                }
                for diff in pb.file_contract_diffs.iter().rev() {
                    self.commit_file_contract_diff(diff, direction)?;
                }
                for diff in pb.siafund_output_diffs.iter().rev() {
                    self.commit_siafund_output_diff(diff, direction)?;
                }
                for diff in pb.delayed_siacoin_output_diffs.iter().rev() {
                    self.commit_delayed_siacoin_output_diff(diff, direction)?;
                }
                for diff in pb.siafund_pool_diffs.iter().rev() {
                    self.commit_siafund_pool_diff(diff, direction)?;
                }
            }
        }

        // the bucket emptied by this commit is deleted only after its
        // contents were consumed by the diffs above
        match direction {
            DiffDirection::Apply => {
                if pb.height > maturity_delay {
                    self.delete_delayed_bucket(pb.height)?;
                }
            }
            DiffDirection::Revert => {
                self.delete_delayed_bucket(pb.height + maturity_delay)?;
            }
        }

        match direction {
            DiffDirection::Apply => {
                self.push_path(&pb.id(), &pb.parent)?;
                trace!(target: "db", "applied block {} at height {}", pb.id(), pb.height);
            }
            DiffDirection::Revert => {
                self.pop_path()?;
                self.verify_revert_checksum()?;
                trace!(target: "db", "reverted block {} at height {}", pb.id(), pb.height);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ConsensusDatabase;
    use crate::kv::{DiskDatabase, MemoryDatabase};
    use chain::Currency;
    use network::{ConsensusParams, Network};
    use storage::{
        BestBlock, ConsensusStore, ConsensusView, DiffDirection, Error, ProcessedBlock,
        SiacoinOutputDiff, SiafundPoolDiff,
    };
    use tempdir::TempDir;
    use test_data::ChainBuilder;

    fn regtest_db() -> (ConsensusDatabase<MemoryDatabase>, ChainBuilder) {
        let chain = ChainBuilder::new(Network::Regtest);
        let db = ConsensusDatabase::open(MemoryDatabase::default(), chain.params().clone())
            .unwrap();
        (db, chain)
    }

    fn checksum(db: &ConsensusDatabase<MemoryDatabase>) -> primitives::H256 {
        db.read(|tx| tx.consensus_checksum()).unwrap()
    }

    /// A hand-built processed block at height one: spends the first
    /// genesis output into a new one and bumps the pool.
    fn handmade_block(chain: &ChainBuilder, pool_previous: u64, pool_adjusted: u64) -> ProcessedBlock {
        let (spent_id, spent_output) = chain.genesis_siacoin_outputs()[0].clone();
        let block = chain.block().build();

        let mut pb = ProcessedBlock::new(block, 1);
        pb.siacoin_output_diffs.push(SiacoinOutputDiff {
            direction: DiffDirection::Revert,
            id: spent_id,
            siacoin_output: spent_output.clone(),
        });
        pb.siacoin_output_diffs.push(SiacoinOutputDiff {
            direction: DiffDirection::Apply,
            id: chain.genesis_transaction().siacoin_output_id(77),
            siacoin_output: spent_output,
        });
        pb.siafund_pool_diffs.push(SiafundPoolDiff {
            direction: DiffDirection::Apply,
            previous: Currency::from(pool_previous),
            adjusted: Currency::from(pool_adjusted),
        });
        pb.diffs_generated = true;
        pb
    }

    #[test]
    fn test_open_seeds_genesis() {
        let (db, chain) = regtest_db();
        let genesis_id = chain.params().genesis_block().id();

        assert_eq!(
            db.best_block(),
            BestBlock {
                height: 0,
                id: genesis_id,
            }
        );
        db.read(|tx| {
            assert_eq!(tx.block_path(0).unwrap(), Some(genesis_id));
            assert_eq!(tx.siafund_pool().unwrap(), Currency::zero());

            let pb = tx.block(&genesis_id).unwrap().unwrap();
            assert!(pb.diffs_generated);
            assert!(pb.consensus_checksum.is_some());

            for (id, output) in chain.genesis_siacoin_outputs() {
                assert_eq!(tx.siacoin_output(&id).unwrap(), Some(output));
            }
            for (id, output) in chain.genesis_siafund_outputs() {
                assert_eq!(tx.siafund_output(&id).unwrap(), Some(output));
            }
        });
    }

    #[test]
    fn test_genesis_survives_reopen() {
        let dir = TempDir::new("sia-consensus-db").unwrap();
        let params = ConsensusParams::new(Network::Regtest);
        let best = {
            let db = ConsensusDatabase::open(DiskDatabase::open(dir.path()).unwrap(), params.clone())
                .unwrap();
            db.best_block()
        };

        let db =
            ConsensusDatabase::open(DiskDatabase::open(dir.path()).unwrap(), params).unwrap();
        assert_eq!(db.best_block(), best);
        assert_ne!(best.id, Default::default());
    }

    #[test]
    fn test_delayed_bucket_lifecycle_is_explicit() {
        let (db, _) = regtest_db();
        let result: Result<(), Error> = db.in_transaction(|tx| {
            tx.create_delayed_bucket(30)?;
            assert!(tx.delayed_bucket_exists(30)?);
            assert_eq!(tx.create_delayed_bucket(30), Err(Error::BucketExists));
            tx.delete_delayed_bucket(30)?;
            assert_eq!(tx.delete_delayed_bucket(30), Err(Error::BucketMissing));
            Ok(())
        });
        result.unwrap();
    }

    #[test]
    fn test_push_path_refuses_non_child() {
        let (db, chain) = regtest_db();
        let orphan = chain.block_on(Default::default(), 1).build();
        let result = db.in_transaction(|tx| tx.push_path(&orphan.id(), &orphan.parent_id));
        assert_eq!(result, Err(Error::WrongAppliedBlock));
    }

    #[test]
    fn test_pop_path_refuses_genesis() {
        let (db, _) = regtest_db();
        let result = db.in_transaction(|tx| tx.pop_path().map(|_| ()));
        assert_eq!(result, Err(Error::PathUnderflow));
    }

    #[test]
    fn test_commit_refuses_ungenerated_diffs() {
        let (db, chain) = regtest_db();
        let mut pb = handmade_block(&chain, 0, 5);
        pb.diffs_generated = false;
        let result = db.in_transaction(|tx| tx.commit_diff_set(&pb, DiffDirection::Apply));
        assert_eq!(result, Err(Error::DiffsNotGenerated));
    }

    #[test]
    fn test_commit_refuses_wrong_block() {
        let (db, chain) = regtest_db();
        let pb = handmade_block(&chain, 0, 5);
        // reverting a block that is not the tip
        let result = db.in_transaction(|tx| tx.commit_diff_set(&pb, DiffDirection::Revert));
        assert_eq!(result, Err(Error::WrongRevertedBlock));
    }

    #[test]
    fn test_apply_then_revert_is_identity() {
        let (db, chain) = regtest_db();
        let before = checksum(&db);
        let pb = handmade_block(&chain, 0, 5);

        db.in_transaction(|tx| tx.commit_diff_set(&pb, DiffDirection::Apply))
            .unwrap();
        assert_eq!(db.best_block().height, 1);
        assert_ne!(checksum(&db), before);
        db.read(|tx| {
            assert!(tx.delayed_bucket_exists(1 + chain.params().maturity_delay).unwrap());
            assert_eq!(tx.siafund_pool().unwrap(), Currency::from(5u64));
        });

        db.in_transaction(|tx| tx.commit_diff_set(&pb, DiffDirection::Revert))
            .unwrap();
        assert_eq!(db.best_block().height, 0);
        assert_eq!(checksum(&db), before);
        db.read(|tx| {
            assert!(!tx.delayed_bucket_exists(1 + chain.params().maturity_delay).unwrap());
            assert_eq!(tx.block_path(1).unwrap(), None);
        });
    }

    #[test]
    fn test_pool_mismatch_is_fatal_and_rolls_back() {
        let (db, chain) = regtest_db();
        let before = checksum(&db);

        // the pool is zero, the diff claims five
        let pb = handmade_block(&chain, 5, 9);
        let result = db.in_transaction(|tx| tx.commit_diff_set(&pb, DiffDirection::Apply));

        assert_eq!(result, Err(Error::SiafundPoolImbalance));
        assert!(result.unwrap_err().is_fatal());
        assert_eq!(db.best_block().height, 0);
        assert_eq!(checksum(&db), before);
        db.read(|tx| {
            // the siacoin diffs committed before the failure left no trace
            let replaced = chain.genesis_transaction().siacoin_output_id(77);
            assert_eq!(tx.siacoin_output(&replaced).unwrap(), None);
        });
    }

    #[test]
    fn test_shrinking_pool_diff_is_refused() {
        let (db, _) = regtest_db();
        let diff = SiafundPoolDiff {
            direction: DiffDirection::Apply,
            previous: Currency::from(9u64),
            adjusted: Currency::from(5u64),
        };
        let result = db.in_transaction(|tx| tx.commit_siafund_pool_diff(&diff, DiffDirection::Apply));
        assert_eq!(result, Err(Error::ShrinkingSiafundPool));
    }

    #[test]
    fn test_revert_direction_pool_diff_is_refused() {
        let (db, _) = regtest_db();
        let diff = SiafundPoolDiff {
            direction: DiffDirection::Revert,
            previous: Currency::zero(),
            adjusted: Currency::from(5u64),
        };
        let result = db.in_transaction(|tx| tx.commit_siafund_pool_diff(&diff, DiffDirection::Apply));
        assert_eq!(result, Err(Error::NonApplyPoolDiff));
    }

    #[test]
    fn test_failed_transaction_leaves_no_partial_state() {
        let (db, chain) = regtest_db();
        let before = checksum(&db);
        let (spent_id, _) = chain.genesis_siacoin_outputs()[0].clone();

        let spend = SiacoinOutputDiff {
            direction: DiffDirection::Revert,
            id: spent_id,
            siacoin_output: chain.genesis_siacoin_outputs()[0].1.clone(),
        };
        let result: Result<(), Error> = db.in_transaction(|tx| {
            tx.create_delayed_bucket(99)?;
            tx.commit_siacoin_output_diff(&spend, DiffDirection::Apply)?;
            Err(Error::Database("forced".into()))
        });

        assert!(result.is_err());
        assert_eq!(checksum(&db), before);
        db.read(|tx| {
            assert!(!tx.delayed_bucket_exists(99).unwrap());
            assert!(tx.siacoin_output(&spent_id).unwrap().is_some());
        });
    }
}
