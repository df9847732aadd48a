use chain::{BlockId, Height};

/// Tip of the best chain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BestBlock {
    pub height: Height,
    pub id: BlockId,
}
