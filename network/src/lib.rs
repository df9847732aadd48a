#[macro_use]
extern crate lazy_static;

mod consensus;
mod network;

pub use crate::consensus::ConsensusParams;
pub use crate::network::Network;
