pub mod bytes;
pub mod hash;

pub use bigint;

pub use crate::bytes::Bytes;
pub use crate::hash::H256;
