use crate::miner_unlock_hash;
use chain::{
    Block, BlockId, Currency, FileContract, FileContractId, Height, SiacoinOutput,
    SiacoinOutputId, SiafundInput, SiafundOutput, SiafundOutputId, SiacoinInput, StorageProof,
    Transaction, UnlockHash,
};
use network::{ConsensusParams, Network};

/// Tracks the tip of a growing test chain and hands out block builders
/// parented on it.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    params: ConsensusParams,
    tip: BlockId,
    height: Height,
}

impl ChainBuilder {
    pub fn new(network: Network) -> ChainBuilder {
        let params = ConsensusParams::new(network);
        let tip = params.genesis_block().id();
        ChainBuilder {
            params,
            tip,
            height: 0,
        }
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    pub fn tip(&self) -> BlockId {
        self.tip
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn genesis_transaction(&self) -> &'static Transaction {
        &self.params.genesis_block().transactions[0]
    }

    pub fn genesis_siacoin_outputs(&self) -> Vec<(SiacoinOutputId, SiacoinOutput)> {
        let tx = self.genesis_transaction();
        tx.siacoin_outputs
            .iter()
            .enumerate()
            .map(|(index, output)| (tx.siacoin_output_id(index as u64), output.clone()))
            .collect()
    }

    pub fn genesis_siafund_outputs(&self) -> Vec<(SiafundOutputId, SiafundOutput)> {
        let tx = self.genesis_transaction();
        tx.siafund_outputs
            .iter()
            .enumerate()
            .map(|(index, output)| (tx.siafund_output_id(index as u64), output.clone()))
            .collect()
    }

    /// A block builder parented on the current tip.
    pub fn block(&self) -> BlockBuilder {
        self.block_on(self.tip, self.height + 1)
    }

    /// A block builder parented on an arbitrary block, for fork chains.
    pub fn block_on(&self, parent: BlockId, height: Height) -> BlockBuilder {
        BlockBuilder {
            params: self.params.clone(),
            parent,
            height,
            nonce: 0,
            timestamp: height,
            miner_payouts: None,
            transactions: Vec::new(),
        }
    }

    /// Records a built block as the new tip.
    pub fn advance(&mut self, block: &Block) {
        assert_eq!(block.parent_id, self.tip, "advanced block must extend the tip");
        self.tip = block.id();
        self.height += 1;
    }

    /// Builds and records `count` empty blocks.
    pub fn generate(&mut self, count: usize) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(count);
        for _ in 0..count {
            let block = self.block().build();
            self.advance(&block);
            blocks.push(block);
        }
        blocks
    }
}

#[derive(Debug, Clone)]
pub struct BlockBuilder {
    params: ConsensusParams,
    parent: BlockId,
    height: Height,
    nonce: u64,
    timestamp: u64,
    miner_payouts: Option<Vec<SiacoinOutput>>,
    transactions: Vec<Transaction>,
}

impl BlockBuilder {
    pub fn with_transaction<T>(mut self, transaction: T) -> BlockBuilder
    where
        T: Into<Transaction>,
    {
        self.transactions.push(transaction.into());
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> BlockBuilder {
        self.nonce = nonce;
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> BlockBuilder {
        self.timestamp = timestamp;
        self
    }

    /// Overrides the computed miner payouts, valid or not.
    pub fn with_miner_payouts(mut self, payouts: Vec<SiacoinOutput>) -> BlockBuilder {
        self.miner_payouts = Some(payouts);
        self
    }

    pub fn build(self) -> Block {
        let miner_payouts = match self.miner_payouts {
            Some(payouts) => payouts,
            None => {
                let mut reward = self.params.block_subsidy(self.height);
                for tx in &self.transactions {
                    for fee in &tx.miner_fees {
                        reward = reward + *fee;
                    }
                }
                vec![SiacoinOutput {
                    value: reward,
                    unlock_hash: miner_unlock_hash(),
                }]
            }
        };

        Block {
            parent_id: self.parent,
            nonce: self.nonce,
            timestamp: self.timestamp,
            miner_payouts,
            transactions: self.transactions,
        }
    }
}

/// Fluent transaction fixture.
#[derive(Debug, Default, Clone)]
pub struct TransactionBuilder {
    pub transaction: Transaction,
}

impl From<TransactionBuilder> for Transaction {
    fn from(builder: TransactionBuilder) -> Transaction {
        builder.transaction
    }
}

impl TransactionBuilder {
    pub fn new() -> TransactionBuilder {
        TransactionBuilder::default()
    }

    pub fn spend(mut self, id: SiacoinOutputId, output: &SiacoinOutput) -> TransactionBuilder {
        self.transaction.siacoin_inputs.push(SiacoinInput {
            parent_id: id,
            unlock_hash: output.unlock_hash,
        });
        self
    }

    pub fn add_output(self, value: u64, unlock_hash: UnlockHash) -> TransactionBuilder {
        self.add_currency_output(Currency::from(value), unlock_hash)
    }

    pub fn add_currency_output(
        mut self,
        value: Currency,
        unlock_hash: UnlockHash,
    ) -> TransactionBuilder {
        self.transaction
            .siacoin_outputs
            .push(SiacoinOutput { value, unlock_hash });
        self
    }

    pub fn add_miner_fee(mut self, value: u64) -> TransactionBuilder {
        self.transaction.miner_fees.push(Currency::from(value));
        self
    }

    pub fn add_file_contract(mut self, contract: FileContract) -> TransactionBuilder {
        self.transaction.file_contracts.push(contract);
        self
    }

    pub fn add_storage_proof(mut self, id: FileContractId) -> TransactionBuilder {
        self.transaction.storage_proofs.push(StorageProof {
            parent_id: id,
            proof: Default::default(),
        });
        self
    }

    pub fn spend_siafund(
        mut self,
        id: SiafundOutputId,
        output: &SiafundOutput,
        claim_unlock_hash: UnlockHash,
    ) -> TransactionBuilder {
        self.transaction.siafund_inputs.push(SiafundInput {
            parent_id: id,
            unlock_hash: output.unlock_hash,
            claim_unlock_hash,
        });
        self
    }

    pub fn add_siafund_output(mut self, value: u64, unlock_hash: UnlockHash) -> TransactionBuilder {
        self.transaction.siafund_outputs.push(SiafundOutput {
            value: Currency::from(value),
            unlock_hash,
            claim_start: Currency::zero(),
        });
        self
    }

    pub fn with_arbitrary_data(mut self, data: Vec<u8>) -> TransactionBuilder {
        self.transaction.arbitrary_data = data.into();
        self
    }

    pub fn build(self) -> Transaction {
        self.transaction
    }
}
