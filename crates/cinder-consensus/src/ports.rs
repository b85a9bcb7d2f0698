//! # Outbound Ports
//!
//! Chain lookups the validators require from the host. The chain store
//! itself lives behind the sync crate's store port; validation only ever
//! needs read access to recent ancestry, expressed here as its own narrow
//! trait.

use std::collections::HashMap;

use shared_types::{Block, BlockHeader, Hash};

/// Read access to already-accepted blocks, used by ommer validation to walk
/// the ancestor window.
pub trait AncestryGateway: Send + Sync {
    /// Header of an accepted block, by hash.
    fn header_by_hash(&self, hash: &Hash) -> Option<BlockHeader>;

    /// Full accepted block, by hash. Needed to see which ommers an ancestor
    /// already included.
    fn block_by_hash(&self, hash: &Hash) -> Option<Block>;
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// Production: the sync crate's chain store adapter.
// Testing: in-memory implementation below.
// =============================================================================

/// In-memory ancestry for tests: a bag of blocks indexed by hash.
#[derive(Debug, Default)]
pub struct InMemoryAncestry {
    blocks: HashMap<Hash, Block>,
}

impl InMemoryAncestry {
    /// Empty ancestry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of blocks.
    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut ancestry = Self::new();
        for block in blocks {
            ancestry.insert(block);
        }
        ancestry
    }

    /// Add a block.
    pub fn insert(&mut self, block: Block) {
        self.blocks.insert(block.hash(), block);
    }
}

impl AncestryGateway for InMemoryAncestry {
    fn header_by_hash(&self, hash: &Hash) -> Option<BlockHeader> {
        self.blocks.get(hash).map(|b| b.header.clone())
    }

    fn block_by_hash(&self, hash: &Hash) -> Option<Block> {
        self.blocks.get(hash).cloned()
    }
}
