use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] storage::Error),
    #[error("transaction {0} is invalid: {1}")]
    Transaction(usize, TransactionError),
    #[error("block header is invalid")]
    InvalidHeader,
    #[error("miner payouts do not match the subsidy plus fees")]
    InvalidMinerPayouts,
    #[error("block parent is unknown")]
    UnknownParent,
    #[error("fork is too long to proceed")]
    AncientFork,
    /// Re-applying the original chain after an abandoned reorganization
    /// failed. The database can no longer be trusted.
    #[error("failed to restore the original chain after an abandoned reorganization")]
    ReorgRollbackFailed,
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        match *self {
            Error::Storage(ref err) => err.is_fatal(),
            Error::ReorgRollbackFailed => true,
            _ => false,
        }
    }
}

/// Reasons a single transaction is rejected.
#[derive(Debug, PartialEq, Error)]
pub enum TransactionError {
    #[error("storage error: {0}")]
    Store(#[from] storage::Error),
    #[error("signatures are invalid")]
    InvalidSignatures,
    #[error("spent siacoin output does not exist")]
    MissingSiacoinOutput,
    #[error("spent siafund output does not exist")]
    MissingSiafundOutput,
    #[error("proven file contract does not exist")]
    MissingFileContract,
    #[error("an output is spent twice")]
    DoubleSpend,
    #[error("input unlock conditions do not match the output")]
    WrongUnlockConditions,
    #[error("zero-value outputs are not allowed")]
    ZeroValueOutput,
    #[error("currency sum overflows")]
    CurrencyOverflow,
    #[error("siacoin inputs do not equal siacoin outputs")]
    SiacoinImbalance,
    #[error("siafund inputs do not equal siafund outputs")]
    SiafundImbalance,
    #[error("file contract window is invalid")]
    ContractWindowInvalid,
    #[error("file contract payouts do not match the payout minus tax")]
    ContractPayoutInvalid,
    #[error("storage proof submitted before the contract window opened")]
    EarlyStorageProof,
    #[error("storage proof is invalid")]
    InvalidStorageProof,
}

#[cfg(test)]
mod tests {
    use super::{Error, TransactionError};

    #[test]
    fn test_fatality() {
        assert!(Error::ReorgRollbackFailed.is_fatal());
        assert!(Error::Storage(storage::Error::SiafundPoolImbalance).is_fatal());
        assert!(!Error::Storage(storage::Error::Database("io".into())).is_fatal());
        assert!(!Error::Transaction(0, TransactionError::DoubleSpend).is_fatal());
        assert!(!Error::InvalidMinerPayouts.is_fatal());
    }
}
