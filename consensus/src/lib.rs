//! Consensus state transitions.
//!
//! Block integration happens in one of two modes:
//!
//! --> A. first visit (the block extends the tip, or a fork block reached
//!        for the first time):
//!
//! A.1 `valid_transaction` then `apply_transaction` for each transaction,
//!     in block order; later transactions may spend outputs of earlier
//!     ones, so validation cannot run ahead of application
//! A.2 block maintenance: matured delayed outputs are promoted, expired
//!     file contracts resolve with their missed outputs, miner payouts are
//!     enqueued as new delayed outputs
//! A.3 the generated diff lists are frozen into the processed block and
//!     stored; from now on the block is replayed, never recomputed
//!
//! --> B. replay (the block has generated diffs):
//!
//! B.1 the stored diff set is committed forward or backward as one unit
//!
//! --> C. chain reorganization:
//!
//! C.1 walk parent links back to the fork point
//! C.2 revert the current chain block by block onto the fork point
//! C.3 apply the fork blocks oldest first, mode A or B per block
//! C.4 if any fork block fails validation, rewind the fork, mark the
//!     forward history bad and re-apply the original chain; failure to
//!     restore the original chain is fatal
//!
//! Every mode runs inside a single store transaction, so a validation
//! failure anywhere leaves no trace on disk.

#[macro_use]
extern crate log;

mod accept_transaction;
mod apply_block;
mod apply_transaction;
mod error;
mod fork;
mod traits;

#[cfg(test)]
mod util;

pub use crate::accept_transaction::valid_transaction;
pub use crate::apply_block::generate_and_apply_diffs;
pub use crate::apply_transaction::apply_transaction;
pub use crate::error::{Error, TransactionError};
pub use crate::fork::{fork_blockchain, ForkCapabilities};
pub use crate::traits::{
    AcceptAllProofs, AcceptAllSignatures, AlwaysValidHeaders, BadBlocks, HeaderValidator,
    MemoryBadBlocks, ProofVerifier, SignatureVerifier,
};
