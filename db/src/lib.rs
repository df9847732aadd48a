//! Persistent consensus state over a transactional key-value store.

#[macro_use]
extern crate log;

mod consensus_db;
pub mod kv;

pub use crate::consensus_db::{ConsensusDatabase, StoreTransaction};
