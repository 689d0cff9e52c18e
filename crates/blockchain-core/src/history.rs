// blockchain-core/src/history.rs

use crate::block::Block;
use crate::types::Height;
use blockchain_crypto::Hash;
use std::collections::{BTreeMap, HashMap};

/// Read-only view over the adopted chain.
///
/// Every Kernel and Validator operation is a pure function of a `History`
/// snapshot — nothing in this crate mutates one. Whatever owns the adopted
/// chain (storage, a networked sync layer, ...) implements this and the
/// in-memory test double below.
pub trait History: Send + Sync {
    /// The most recently adopted block, or `None` if history is empty.
    fn last_block(&self) -> Option<Block>;

    /// Look up an adopted block by id.
    fn block_by_id(&self, id: &Hash) -> Option<Block>;

    /// Walk `depth` ancestors back from `block` (`depth == 0` returns `block`
    /// itself). Returns `None` if the walk runs off the front of history.
    fn parent(&self, block: &Block, depth: u32) -> Option<Block>;

    /// The height of an adopted block, or `None` if it is not in history.
    fn height_of(&self, id: &Hash) -> Option<Height>;

    /// The height of the most recently adopted block. Genesis is height 1;
    /// an empty history reports height 0.
    fn height(&self) -> Height;
}

/// In-memory `History` used by the demo binary and by tests. Holds every
/// block it has ever been given — no pruning, no reorg support: it models
/// a single linear chain being extended one block at a time.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    blocks: HashMap<Hash, Block>,
    heights: HashMap<Hash, Height>,
    by_height: BTreeMap<Height, Hash>,
    head: Option<Hash>,
}

impl InMemoryHistory {
    pub fn new(genesis: Block) -> Self {
        let id = genesis.id;
        let mut blocks = HashMap::new();
        let mut heights = HashMap::new();
        let mut by_height = BTreeMap::new();
        blocks.insert(id, genesis);
        heights.insert(id, 1);
        by_height.insert(1, id);
        Self {
            blocks,
            heights,
            by_height,
            head: Some(id),
        }
    }

    /// Extend history with a newly adopted block. Panics if `block`'s
    /// parent is not already in history — callers are expected to have
    /// validated the block first.
    pub fn apply_block(&mut self, block: Block) {
        let parent_height = *self
            .heights
            .get(&block.parent_id)
            .expect("apply_block: parent not in history");
        let height = parent_height + 1;
        let id = block.id;
        self.blocks.insert(id, block);
        self.heights.insert(id, height);
        self.by_height.insert(height, id);
        self.head = Some(id);
        tracing::debug!(height, block_id = %id, "applied block to history");
    }
}

impl History for InMemoryHistory {
    fn last_block(&self) -> Option<Block> {
        self.head.and_then(|id| self.blocks.get(&id)).cloned()
    }

    fn block_by_id(&self, id: &Hash) -> Option<Block> {
        self.blocks.get(id).cloned()
    }

    fn parent(&self, block: &Block, depth: u32) -> Option<Block> {
        let mut current = self.blocks.get(&block.id)?.clone();
        for _ in 0..depth {
            if current.is_genesis() {
                return None;
            }
            current = self.blocks.get(&current.parent_id)?.clone();
        }
        Some(current)
    }

    fn height_of(&self, id: &Hash) -> Option<Height> {
        self.heights.get(id).copied()
    }

    fn height(&self) -> Height {
        self.head.and_then(|id| self.heights.get(&id)).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ConsensusData;
    use blockchain_crypto::PublicKey;

    fn child_of(parent: &Block) -> Block {
        Block::new(
            parent.id,
            parent.timestamp + 1_000,
            PublicKey::zero(),
            ConsensusData {
                base_target: parent.consensus.base_target,
                generation_signature: Hash::zero(),
            },
            Vec::new(),
            parent.score + 1,
            Vec::new(),
        )
    }

    #[test]
    fn genesis_is_height_one() {
        let genesis = Block::genesis(0, 1_000);
        let history = InMemoryHistory::new(genesis.clone());
        assert_eq!(history.height(), 1);
        assert_eq!(history.height_of(&genesis.id), Some(1));
    }

    #[test]
    fn apply_block_advances_head_and_height() {
        let genesis = Block::genesis(0, 1_000);
        let mut history = InMemoryHistory::new(genesis.clone());
        let b1 = child_of(&genesis);
        history.apply_block(b1.clone());

        assert_eq!(history.height(), 2);
        assert_eq!(history.last_block().unwrap().id, b1.id);
        assert_eq!(history.parent(&b1, 1).unwrap().id, genesis.id);
    }

    #[test]
    fn parent_walk_past_genesis_is_none() {
        let genesis = Block::genesis(0, 1_000);
        let history = InMemoryHistory::new(genesis.clone());
        assert!(history.parent(&genesis, 1).is_none());
    }
}
