//! # Sync Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::{BlockNumber, Hash, NodeId};

/// What the manager knows about one connected peer.
///
/// Owned by the manager for the lifetime of the connection; destroyed on
/// disconnect. The advertised head is refreshed whenever the peer answers a
/// head-info request or announces a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerSession {
    /// Remote identity.
    pub node_id: NodeId,
    /// Advertised head block hash, once known.
    pub head_hash: Option<Hash>,
    /// Advertised head block number, once known.
    pub head_number: Option<BlockNumber>,
    /// Consecutive failures attributed to this peer.
    pub failed_attempts: u32,
    /// Set when a retrieval from this peer failed; cleared by the next
    /// successful head-info refresh. A cooling peer is never picked as the
    /// retrieval target, which is what prevents retrying the same peer for
    /// the same range within an episode.
    pub cooling: bool,
}

impl PeerSession {
    /// Fresh session for a newly added peer.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            head_hash: None,
            head_number: None,
            failed_attempts: 0,
            cooling: false,
        }
    }

    /// Record a refreshed advertised head.
    pub fn update_head(&mut self, hash: Hash, number: BlockNumber) {
        self.head_hash = Some(hash);
        self.head_number = Some(number);
        self.cooling = false;
    }

    /// Record a failure attributed to this peer.
    pub fn record_failure(&mut self) {
        self.failed_attempts += 1;
        self.cooling = true;
    }

    /// True once head info has arrived and the peer is not cooling down.
    pub fn is_retrieval_candidate(&self) -> bool {
        self.head_number.is_some() && !self.cooling
    }
}

/// The manager's coarse state. Transitions are driven by peer arrival and
/// the retrieval loop; `Synced` is (re)entered whenever the local best
/// catches up with every live peer head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// No peers, or not started.
    Idle,
    /// A peer was added; its head-info request is in flight.
    AwaitingPeerInfo,
    /// Peer heads are being compared against the local best.
    Comparing,
    /// A header/body range request is in flight.
    Retrieving,
    /// Retrieved blocks are being validated and inserted.
    ValidatingAndInserting,
    /// Local best has caught up with the best known peer head.
    Synced,
}
