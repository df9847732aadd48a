use crate::network::Network;
use chain::{Block, Currency, Height};

/// Parameters for consensus rules, described in the ledger rules.
#[derive(Debug, Clone)]
pub struct ConsensusParams {
    pub network: Network,
    /// Blocks between the creation of a delayed output and the height at
    /// which it becomes spendable.
    pub maturity_delay: Height,
    /// Fractional excess in cumulative work a competing chain must show
    /// over the current best chain before a reorganization is triggered,
    /// as a numerator and denominator.
    pub surpass_threshold: (u64, u64),
    /// Height at which the siafund tax arithmetic switched representation.
    pub tax_hardfork_height: Height,
    /// Total number of siafunds in existence.
    pub siafund_count: u64,
    /// Block subsidy in whole coins at height zero.
    pub initial_coinbase: u64,
    /// Floor for the block subsidy in whole coins.
    pub minimum_coinbase: u64,
}

impl ConsensusParams {
    pub fn new(network: Network) -> Self {
        match network {
            Network::Mainnet => ConsensusParams {
                network,
                maturity_delay: 144,
                surpass_threshold: (20, 100),
                tax_hardfork_height: 21_000,
                siafund_count: 10_000,
                initial_coinbase: 300_000,
                minimum_coinbase: 30_000,
            },
            Network::Testnet => ConsensusParams {
                network,
                maturity_delay: 144,
                surpass_threshold: (20, 100),
                tax_hardfork_height: 10,
                siafund_count: 10_000,
                initial_coinbase: 300_000,
                minimum_coinbase: 30_000,
            },
            Network::Regtest => ConsensusParams {
                network,
                maturity_delay: 10,
                surpass_threshold: (20, 100),
                tax_hardfork_height: 10,
                siafund_count: 10_000,
                initial_coinbase: 10,
                minimum_coinbase: 1,
            },
        }
    }

    pub fn genesis_block(&self) -> &'static Block {
        self.network.genesis_block()
    }

    /// Subsidy paid to the miner of a block at the given height, excluding
    /// transaction fees. Decreases by one coin per block until the floor.
    pub fn block_subsidy(&self, height: Height) -> Currency {
        let coins = self
            .initial_coinbase
            .saturating_sub(height)
            .max(self.minimum_coinbase);
        Currency::from_coins(coins)
    }

    pub fn tax(&self, height: Height, payout: &Currency) -> Currency {
        chain::tax(height, payout, self.tax_hardfork_height, self.siafund_count)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConsensusParams, Network};
    use chain::Currency;

    #[test]
    fn test_subsidy_decreases_to_floor() {
        let params = ConsensusParams::new(Network::Mainnet);
        assert_eq!(params.block_subsidy(0), Currency::from_coins(300_000));
        assert_eq!(params.block_subsidy(1), Currency::from_coins(299_999));
        assert_eq!(params.block_subsidy(270_000), Currency::from_coins(30_000));
        assert_eq!(params.block_subsidy(1_000_000), Currency::from_coins(30_000));
    }

    #[test]
    fn test_regtest_has_short_maturity_delay() {
        let params = ConsensusParams::new(Network::Regtest);
        assert!(params.maturity_delay < 20);
    }
}
