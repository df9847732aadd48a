use chain::{Block, Currency, SiacoinOutput, SiafundOutput, Transaction, UnlockHash};
use primitives::H256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    /// Private test network with a short maturity delay.
    Regtest,
}

lazy_static! {
    static ref MAINNET_GENESIS: Block = genesis_block(
        1433600000,
        Vec::new(),
        vec![SiafundOutput {
            value: Currency::from(10_000u64),
            unlock_hash: UnlockHash::from(H256::from_low_u64_be(0x0f0f)),
            claim_start: Currency::zero(),
        }],
    );
    static ref TESTNET_GENESIS: Block = genesis_block(
        1433600001,
        Vec::new(),
        vec![SiafundOutput {
            value: Currency::from(10_000u64),
            unlock_hash: UnlockHash::from(H256::from_low_u64_be(0x0e0e)),
            claim_start: Currency::zero(),
        }],
    );
    static ref REGTEST_GENESIS: Block = genesis_block(
        0,
        vec![
            SiacoinOutput {
                value: Currency::from(100u64),
                unlock_hash: UnlockHash::from(H256::from_low_u64_be(1)),
            },
            SiacoinOutput {
                value: Currency::from(1_000_000u64),
                unlock_hash: UnlockHash::from(H256::from_low_u64_be(1)),
            },
        ],
        vec![SiafundOutput {
            value: Currency::from(10_000u64),
            unlock_hash: UnlockHash::from(H256::from_low_u64_be(2)),
            claim_start: Currency::zero(),
        }],
    );
}

/// The genesis allocation travels in a single transaction so the outputs
/// get ordinary transaction-derived identifiers.
fn genesis_block(
    timestamp: u64,
    siacoin_outputs: Vec<SiacoinOutput>,
    siafund_outputs: Vec<SiafundOutput>,
) -> Block {
    Block {
        timestamp,
        transactions: vec![Transaction {
            siacoin_outputs,
            siafund_outputs,
            ..Default::default()
        }],
        ..Default::default()
    }
}

impl Network {
    pub fn genesis_block(&self) -> &'static Block {
        match *self {
            Network::Mainnet => &MAINNET_GENESIS,
            Network::Testnet => &TESTNET_GENESIS,
            Network::Regtest => &REGTEST_GENESIS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Network;

    #[test]
    fn test_genesis_blocks_are_distinct() {
        assert_ne!(
            Network::Mainnet.genesis_block().id(),
            Network::Testnet.genesis_block().id()
        );
        assert_ne!(
            Network::Mainnet.genesis_block().id(),
            Network::Regtest.genesis_block().id()
        );
    }

    #[test]
    fn test_genesis_carries_allocation() {
        let genesis = Network::Regtest.genesis_block();
        assert_eq!(genesis.transactions.len(), 1);
        assert!(!genesis.transactions[0].siacoin_outputs.is_empty());
        assert!(!genesis.transactions[0].siafund_outputs.is_empty());
        assert!(genesis.parent_id.is_zero());
    }
}
