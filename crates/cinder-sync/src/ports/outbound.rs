//! # Outbound Ports
//!
//! Capabilities the sync manager requires from the host: a peer to retrieve
//! from and a chain store to propose validated blocks to.
//!
//! The peer trait is deliberately minimal — head hash, head number, header
//! range, body range — so any transport implementation can satisfy it and
//! tests can substitute a fake instead of a live network peer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Block, BlockBody, BlockHeader, BlockNumber, Hash, NodeId};

use crate::domain::{PeerRequestError, StoreError};

/// A connected peer able to serve chain data. Every call may fail (network
/// error, timeout upstream) or return less than requested.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Remote identity.
    fn node_id(&self) -> NodeId;

    /// Hash of the peer's advertised head block.
    async fn head_block_hash(&self) -> Result<Hash, PeerRequestError>;

    /// Number of the peer's advertised head block.
    async fn head_block_number(&self) -> Result<BlockNumber, PeerRequestError>;

    /// Up to `max_count` headers ascending from the block with `start`
    /// (inclusive), taking every `skip + 1`-th block.
    async fn block_headers(
        &self,
        start: Hash,
        max_count: u64,
        skip: u64,
    ) -> Result<Vec<BlockHeader>, PeerRequestError>;

    /// Bodies for the given header hashes, in request order. May be shorter
    /// than the request if the peer is missing some.
    async fn block_bodies(&self, hashes: Vec<Hash>) -> Result<Vec<BlockBody>, PeerRequestError>;
}

/// The authoritative ordered history of accepted blocks.
///
/// Insertion is the sole arbiter of canonicality: this crate proposes
/// validated blocks and keeps no second record of what was accepted. The
/// store serializes concurrent inserts internally.
pub trait ChainStore: Send + Sync {
    /// The genesis block, if the store is initialized.
    fn genesis_block(&self) -> Option<Block>;

    /// The store's current notion of the chain tip.
    fn best_suggested_block(&self) -> Option<Block>;

    /// Append a validated block. The parent must already be present.
    /// Re-inserting an already-present block is a no-op success.
    fn insert(&self, block: Block) -> Result<(), StoreError>;

    /// Accepted block by hash.
    fn block_by_hash(&self, hash: &Hash) -> Option<Block>;

    /// Accepted block by number.
    fn block_by_number(&self, number: BlockNumber) -> Option<Block>;
}

// =============================================================================
// MOCK IMPLEMENTATIONS FOR TESTING
// Production adapters live with the host's transport and storage engines.
// =============================================================================

/// Per-call request counters, so tests can assert on traffic.
#[derive(Debug, Default)]
pub struct RequestCounters {
    /// `head_block_hash` calls served.
    pub head_hash: AtomicUsize,
    /// `head_block_number` calls served.
    pub head_number: AtomicUsize,
    /// `block_headers` calls served.
    pub headers: AtomicUsize,
    /// `block_bodies` calls served.
    pub bodies: AtomicUsize,
}

/// A scripted peer serving a fixed chain.
pub struct MockPeer {
    node_id: NodeId,
    /// Full chain including genesis, ascending.
    chain: Vec<Block>,
    /// Fail head-info requests.
    pub fail_head_requests: bool,
    /// Fail header-range requests.
    pub fail_header_requests: bool,
    /// Fail body requests.
    pub fail_body_requests: bool,
    /// Zero out the parent hash of the second header served, producing a
    /// batch whose first new header fails parent linkage.
    pub corrupt_headers: bool,
    /// Traffic counters.
    pub counters: RequestCounters,
    /// Recorded header-range requests `(start, max_count, skip)`.
    pub header_requests: RwLock<Vec<(Hash, u64, u64)>>,
}

impl MockPeer {
    /// A peer whose head is the last block of `chain`.
    pub fn new(node_id: NodeId, chain: Vec<Block>) -> Self {
        Self {
            node_id,
            chain,
            fail_head_requests: false,
            fail_header_requests: false,
            fail_body_requests: false,
            corrupt_headers: false,
            counters: RequestCounters::default(),
            header_requests: RwLock::new(Vec::new()),
        }
    }

    fn head(&self) -> Result<&Block, PeerRequestError> {
        self.chain.last().ok_or(PeerRequestError::EmptyResponse)
    }
}

#[async_trait]
impl PeerClient for MockPeer {
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    async fn head_block_hash(&self) -> Result<Hash, PeerRequestError> {
        self.counters.head_hash.fetch_add(1, Ordering::SeqCst);
        if self.fail_head_requests {
            return Err(PeerRequestError::Network("mock head failure".into()));
        }
        Ok(self.head()?.hash())
    }

    async fn head_block_number(&self) -> Result<BlockNumber, PeerRequestError> {
        self.counters.head_number.fetch_add(1, Ordering::SeqCst);
        if self.fail_head_requests {
            return Err(PeerRequestError::Network("mock head failure".into()));
        }
        Ok(self.head()?.number())
    }

    async fn block_headers(
        &self,
        start: Hash,
        max_count: u64,
        skip: u64,
    ) -> Result<Vec<BlockHeader>, PeerRequestError> {
        self.counters.headers.fetch_add(1, Ordering::SeqCst);
        self.header_requests.write().push((start, max_count, skip));
        if self.fail_header_requests {
            return Err(PeerRequestError::Network("mock header failure".into()));
        }

        let start_index = self
            .chain
            .iter()
            .position(|b| b.hash() == start)
            .ok_or(PeerRequestError::EmptyResponse)?;

        let mut headers: Vec<BlockHeader> = self
            .chain
            .iter()
            .skip(start_index)
            .step_by(skip as usize + 1)
            .take(max_count as usize)
            .map(|b| b.header.clone())
            .collect();

        if self.corrupt_headers && headers.len() > 1 {
            headers[1].parent_hash = [0u8; 32];
        }

        Ok(headers)
    }

    async fn block_bodies(&self, hashes: Vec<Hash>) -> Result<Vec<BlockBody>, PeerRequestError> {
        self.counters.bodies.fetch_add(1, Ordering::SeqCst);
        if self.fail_body_requests {
            return Err(PeerRequestError::Network("mock body failure".into()));
        }

        Ok(hashes
            .iter()
            .filter_map(|h| self.chain.iter().find(|b| b.hash() == *h))
            .map(BlockBody::from)
            .collect())
    }
}

/// In-memory chain store for tests. Enforces the parent-present invariant
/// and serializes inserts behind one lock, like the real engine.
pub struct InMemoryChainStore {
    inner: RwLock<StoreInner>,
}

struct StoreInner {
    by_hash: HashMap<Hash, Block>,
    by_number: HashMap<BlockNumber, Hash>,
    genesis: Hash,
    best: Hash,
}

impl InMemoryChainStore {
    /// A store seeded with its genesis block.
    pub fn new(genesis: Block) -> Self {
        let hash = genesis.hash();
        let mut by_hash = HashMap::new();
        let mut by_number = HashMap::new();
        by_number.insert(genesis.number(), hash);
        by_hash.insert(hash, genesis);
        Self {
            inner: RwLock::new(StoreInner {
                by_hash,
                by_number,
                genesis: hash,
                best: hash,
            }),
        }
    }

    /// Number of accepted blocks, genesis included.
    pub fn len(&self) -> usize {
        self.inner.read().by_hash.len()
    }

    /// True if only genesis is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl ChainStore for InMemoryChainStore {
    fn genesis_block(&self) -> Option<Block> {
        let inner = self.inner.read();
        inner.by_hash.get(&inner.genesis).cloned()
    }

    fn best_suggested_block(&self) -> Option<Block> {
        let inner = self.inner.read();
        inner.by_hash.get(&inner.best).cloned()
    }

    fn insert(&self, block: Block) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let hash = block.hash();

        if inner.by_hash.contains_key(&hash) {
            return Ok(());
        }

        if !inner.by_hash.contains_key(&block.header.parent_hash) {
            return Err(StoreError::ParentNotFound(block.header.parent_hash));
        }

        let best_number = inner.by_hash[&inner.best].number();
        inner.by_number.insert(block.number(), hash);
        if block.number() > best_number {
            inner.best = hash;
        }
        inner.by_hash.insert(hash, block);
        Ok(())
    }

    fn block_by_hash(&self, hash: &Hash) -> Option<Block> {
        self.inner.read().by_hash.get(hash).cloned()
    }

    fn block_by_number(&self, number: BlockNumber) -> Option<Block> {
        let inner = self.inner.read();
        inner
            .by_number
            .get(&number)
            .and_then(|h| inner.by_hash.get(h))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::BlockHeader;

    fn chain(len: u64) -> Vec<Block> {
        let mut blocks = vec![Block::new(
            BlockHeader {
                number: 0,
                timestamp: 1_000,
                ..Default::default()
            },
            vec![],
            vec![],
        )];
        for n in 1..len {
            let parent = blocks.last().unwrap();
            blocks.push(Block::new(
                BlockHeader {
                    parent_hash: parent.hash(),
                    number: n,
                    timestamp: parent.header.timestamp + 5,
                    ..Default::default()
                },
                vec![],
                vec![],
            ));
        }
        blocks
    }

    #[tokio::test]
    async fn test_mock_peer_serves_head_info() {
        let blocks = chain(4);
        let head = blocks.last().unwrap().clone();
        let peer = MockPeer::new(NodeId([1u8; 32]), blocks);

        assert_eq!(peer.head_block_hash().await.unwrap(), head.hash());
        assert_eq!(peer.head_block_number().await.unwrap(), 3);
        assert_eq!(peer.counters.head_hash.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mock_peer_serves_header_range() {
        let blocks = chain(4);
        let genesis_hash = blocks[0].hash();
        let peer = MockPeer::new(NodeId([1u8; 32]), blocks);

        let headers = peer.block_headers(genesis_hash, 4, 0).await.unwrap();
        assert_eq!(headers.len(), 4);
        assert_eq!(headers[0].number, 0);
        assert_eq!(headers[3].number, 3);
        assert_eq!(
            peer.header_requests.read().as_slice(),
            &[(genesis_hash, 4, 0)]
        );
    }

    #[tokio::test]
    async fn test_mock_peer_short_range_past_head() {
        let blocks = chain(3);
        let genesis_hash = blocks[0].hash();
        let peer = MockPeer::new(NodeId([1u8; 32]), blocks);

        let headers = peer.block_headers(genesis_hash, 10, 0).await.unwrap();
        assert_eq!(headers.len(), 3);
    }

    #[tokio::test]
    async fn test_mock_peer_failure_switches() {
        let mut peer = MockPeer::new(NodeId([1u8; 32]), chain(3));
        peer.fail_head_requests = true;
        assert!(peer.head_block_hash().await.is_err());
    }

    #[test]
    fn test_store_enforces_parent_presence() {
        let blocks = chain(3);
        let store = InMemoryChainStore::new(blocks[0].clone());

        // Block 2 before block 1: orphan.
        assert!(matches!(
            store.insert(blocks[2].clone()),
            Err(StoreError::ParentNotFound(_))
        ));

        store.insert(blocks[1].clone()).unwrap();
        store.insert(blocks[2].clone()).unwrap();
        assert_eq!(store.best_suggested_block().unwrap().number(), 2);
    }

    #[test]
    fn test_store_reinsert_is_noop() {
        let blocks = chain(2);
        let store = InMemoryChainStore::new(blocks[0].clone());
        store.insert(blocks[1].clone()).unwrap();
        store.insert(blocks[1].clone()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_lookup_by_number() {
        let blocks = chain(3);
        let store = InMemoryChainStore::new(blocks[0].clone());
        store.insert(blocks[1].clone()).unwrap();

        assert_eq!(store.block_by_number(1).unwrap().hash(), blocks[1].hash());
        assert!(store.block_by_number(7).is_none());
    }
}
