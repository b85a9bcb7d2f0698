//! # Inbound Port
//!
//! The synchronization API exposed to the rest of the node.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Block, NodeId};
use tokio::sync::watch;

use super::outbound::PeerClient;
use crate::domain::SyncPhase;

/// Primary API of the synchronization manager.
#[async_trait]
pub trait SyncApi: Send + Sync {
    /// Register a peer. Once the manager is started this triggers a
    /// head-info request; before that the peer is queued.
    async fn add_peer(&self, peer: Arc<dyn PeerClient>);

    /// Drop a peer's session. In-flight requests to it are abandoned.
    async fn remove_peer(&self, node_id: NodeId);

    /// Begin processing: queued peers are interrogated and future peers are
    /// processed as they arrive. Idempotent.
    fn start(&self);

    /// A peer announced a freshly produced block. Updates the peer's head
    /// bookkeeping; a block extending the local best directly is validated
    /// and inserted inline.
    async fn notify_new_block(&self, block: Block, from: NodeId);

    /// Observe the synced flag. The receiver sees the `false -> true` edge
    /// each time the manager (re)enters `Synced`; dropping a receiver has no
    /// effect on the manager.
    fn synced_watch(&self) -> watch::Receiver<bool>;

    /// Current coarse phase.
    fn phase(&self) -> SyncPhase;
}
