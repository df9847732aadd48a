mod block;
mod currency;
mod specifiers;
mod tax;
mod transaction;
mod types;

pub use primitives::{bytes, hash};

pub use crate::block::Block;
pub use crate::currency::Currency;
pub use crate::specifiers::Specifier;
pub use crate::tax::tax;
pub use crate::transaction::{
    FileContract, SiacoinInput, SiacoinOutput, SiafundInput, SiafundOutput, StorageProof,
    Transaction,
};
pub use crate::types::{
    BlockId, FileContractId, Height, SiacoinOutputId, SiafundOutputId, UnlockHash,
};
