use thiserror::Error;

/// Storage-layer failures.
///
/// The variants flagged by `is_fatal` indicate a corrupt database or a
/// programming bug rather than bad input; the enclosing transaction is
/// rolled back and the error must not be retried.
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// Low level database error
    #[error("database error: {0}")]
    Database(String),
    /// Stored bytes failed to decode
    #[error("stored value is unreadable")]
    Corrupt,
    /// Block is absent from the block map
    #[error("block is unknown")]
    UnknownBlock,
    /// Block parent is absent from the block map
    #[error("block parent is unknown")]
    UnknownParent,

    #[error("cannot apply a block that is not a child of the current block")]
    WrongAppliedBlock,
    #[error("cannot revert a block that is not the current block")]
    WrongRevertedBlock,
    #[error("diff set of the block has not been generated")]
    DiffsNotGenerated,
    #[error("diff set of the block has already been generated")]
    DiffsAlreadyGenerated,
    #[error("siafund pool diff was authored in the revert direction")]
    NonApplyPoolDiff,
    #[error("siafund pool does not match the committed diff")]
    SiafundPoolImbalance,
    #[error("siafund pool is not allowed to shrink")]
    ShrinkingSiafundPool,
    #[error("siacoin output is missing")]
    MissingSiacoinOutput,
    #[error("siacoin output already exists")]
    ExistingSiacoinOutput,
    #[error("file contract is missing")]
    MissingFileContract,
    #[error("file contract already exists")]
    ExistingFileContract,
    #[error("siafund output is missing")]
    MissingSiafundOutput,
    #[error("siafund output already exists")]
    ExistingSiafundOutput,
    #[error("delayed siacoin output is missing")]
    MissingDelayedOutput,
    #[error("delayed siacoin output already exists")]
    ExistingDelayedOutput,
    #[error("delayed output bucket is missing")]
    BucketMissing,
    #[error("delayed output bucket already exists")]
    BucketExists,
    #[error("cannot pop the genesis block off the path")]
    PathUnderflow,
    #[error("consensus checksum mismatch after revert")]
    ChecksumMismatch,
}

impl Error {
    /// True for diff invariant violations. These indicate corruption or a
    /// bug, never recoverable input.
    pub fn is_fatal(&self) -> bool {
        match *self {
            Error::Database(_) | Error::UnknownBlock | Error::UnknownParent => false,
            _ => true,
        }
    }
}

impl From<ser::Error> for Error {
    fn from(_: ser::Error) -> Self {
        Error::Corrupt
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_fatality_split() {
        assert!(!Error::Database("io".into()).is_fatal());
        assert!(!Error::UnknownBlock.is_fatal());
        assert!(Error::SiafundPoolImbalance.is_fatal());
        assert!(Error::WrongRevertedBlock.is_fatal());
        assert!(Error::ChecksumMismatch.is_fatal());
    }
}
