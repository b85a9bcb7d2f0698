//! # Synchronization Manager
//!
//! Maintains a live view of peer chain heads and pulls the local chain store
//! up to the best known head, validating everything on the way.
//!
//! ## Concurrency model
//!
//! Head-info requests run as independent tasks, one per peer, and may
//! suspend on the network. Retrieval episodes are serialized on a single
//! driver task fed by a trigger channel, which also serializes all store
//! insert calls issued by this manager. Validation itself is synchronous and
//! CPU-bound.
//!
//! ## Failure containment
//!
//! Per-request and per-block failures are logged, attributed to the peer
//! that sourced them, and end at the episode boundary. The manager itself
//! only fails at construction, when the store cannot produce a valid
//! genesis.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use cinder_consensus::{AncestryGateway, BlockValidator, HeaderValidator};
use parking_lot::{Mutex, RwLock};
use shared_types::{Block, BlockHeader, Hash, NodeId};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::domain::{PeerRequestError, PeerSession, SyncError, SyncPhase};
use crate::ports::inbound::SyncApi;
use crate::ports::outbound::{ChainStore, PeerClient};

/// Exposes a [`ChainStore`] as the ancestry lookup the ommers validator
/// needs, so validation and sync share one source of accepted blocks.
pub struct StoreAncestry {
    store: Arc<dyn ChainStore>,
}

impl StoreAncestry {
    /// Wrap a store.
    pub fn new(store: Arc<dyn ChainStore>) -> Self {
        Self { store }
    }
}

impl AncestryGateway for StoreAncestry {
    fn header_by_hash(&self, hash: &Hash) -> Option<BlockHeader> {
        self.store.block_by_hash(hash).map(|b| b.header)
    }

    fn block_by_hash(&self, hash: &Hash) -> Option<Block> {
        self.store.block_by_hash(hash)
    }
}

struct PeerEntry {
    session: PeerSession,
    client: Arc<dyn PeerClient>,
}

struct Inner {
    store: Arc<dyn ChainStore>,
    block_validator: BlockValidator,
    header_validator: HeaderValidator,
    config: SyncConfig,
    peers: RwLock<HashMap<NodeId, PeerEntry>>,
    trigger_tx: mpsc::UnboundedSender<NodeId>,
    /// Taken by the first `start()`.
    trigger_rx: Mutex<Option<mpsc::UnboundedReceiver<NodeId>>>,
    synced_tx: watch::Sender<bool>,
    started: AtomicBool,
    phase: RwLock<SyncPhase>,
}

/// The synchronization manager. Cheap to clone handles are not provided;
/// share it behind an [`Arc`] where needed.
pub struct SyncManager {
    inner: Arc<Inner>,
}

impl SyncManager {
    /// Construct the manager. Fatal if the store has no genesis block or its
    /// genesis fails genesis-path validation; everything after construction
    /// is contained.
    pub fn new(
        store: Arc<dyn ChainStore>,
        block_validator: BlockValidator,
        header_validator: HeaderValidator,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        let genesis = store.genesis_block().ok_or(SyncError::MissingGenesis)?;
        header_validator.validate(&genesis.header, None)?;

        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (synced_tx, _) = watch::channel(false);

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                block_validator,
                header_validator,
                config,
                peers: RwLock::new(HashMap::new()),
                trigger_tx,
                trigger_rx: Mutex::new(Some(trigger_rx)),
                synced_tx,
                started: AtomicBool::new(false),
                phase: RwLock::new(SyncPhase::Idle),
            }),
        })
    }

    /// True once the synced flag is up.
    pub fn is_synced(&self) -> bool {
        *self.inner.synced_tx.borrow()
    }

    /// Await the next `Synced` entry (returns immediately if already there).
    /// Cancelling the returned future does not disturb the manager.
    pub async fn wait_synced(&self) {
        let mut rx = self.inner.synced_tx.subscribe();
        // Closed channel would mean the manager itself is gone.
        let _ = rx.wait_for(|synced| *synced).await;
    }

    /// Live peer count.
    pub fn peer_count(&self) -> usize {
        self.inner.peers.read().len()
    }

    fn set_phase(inner: &Inner, phase: SyncPhase) {
        let mut current = inner.phase.write();
        if *current != phase {
            debug!(?phase, "sync phase change");
            *current = phase;
        }
    }

    fn enter_synced(inner: &Inner) {
        Self::set_phase(inner, SyncPhase::Synced);
        let fired = inner.synced_tx.send_if_modified(|synced| {
            if *synced {
                false
            } else {
                *synced = true;
                true
            }
        });
        if fired {
            info!("chain sync complete");
        }
    }

    fn leave_synced(inner: &Inner) {
        inner.synced_tx.send_if_modified(|synced| {
            if *synced {
                *synced = false;
                true
            } else {
                false
            }
        });
    }

    /// Attribute a failure to a peer. Drops the peer once it exhausts its
    /// budget; otherwise schedules a head-info refresh so it can become a
    /// retrieval candidate again. Returns true if the peer was dropped.
    fn penalize(inner: &Arc<Inner>, node_id: NodeId, why: &str) -> bool {
        let dropped = {
            let mut peers = inner.peers.write();
            match peers.get_mut(&node_id) {
                None => return true,
                Some(entry) => {
                    entry.session.record_failure();
                    let exhausted =
                        entry.session.failed_attempts >= inner.config.max_peer_failures;
                    if exhausted {
                        peers.remove(&node_id);
                    }
                    exhausted
                }
            }
        };

        if dropped {
            warn!(peer = %node_id.short(), why, "peer dropped after repeated failures");
        } else {
            warn!(peer = %node_id.short(), why, "peer penalized");
            Self::spawn_head_info(inner.clone(), node_id);
        }
        dropped
    }

    fn spawn_head_info(inner: Arc<Inner>, node_id: NodeId) {
        tokio::spawn(async move {
            Self::head_info_task(inner, node_id).await;
        });
    }

    /// Ask one peer for its head hash and number. A failure is penalized;
    /// `penalize` schedules the retry for a retained peer, so each attempt
    /// burns one unit of the peer's failure budget.
    async fn head_info_task(inner: Arc<Inner>, node_id: NodeId) {
        let client = match inner.peers.read().get(&node_id) {
            Some(entry) => entry.client.clone(),
            None => return,
        };

        let result = async {
            let hash = Self::with_timeout(&inner.config, client.head_block_hash()).await?;
            let number = Self::with_timeout(&inner.config, client.head_block_number()).await?;
            Ok::<_, PeerRequestError>((hash, number))
        }
        .await;

        match result {
            Ok((hash, number)) => {
                debug!(peer = %node_id.short(), head = number, "peer head info received");
                if let Some(entry) = inner.peers.write().get_mut(&node_id) {
                    entry.session.update_head(hash, number);
                }
                let _ = inner.trigger_tx.send(node_id);
            }
            Err(error) => {
                let dropped =
                    Self::penalize(&inner, node_id, &format!("head info request: {error}"));
                if dropped {
                    // The departed peer may have been the last thing keeping
                    // us from Synced; re-evaluate.
                    let _ = inner.trigger_tx.send(node_id);
                }
            }
        }
    }

    async fn with_timeout<T>(
        config: &SyncConfig,
        fut: impl Future<Output = Result<T, PeerRequestError>>,
    ) -> Result<T, PeerRequestError> {
        match timeout(config.request_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(PeerRequestError::Timeout),
        }
    }

    /// Driver loop: one trigger may cover many queued updates; each wake-up
    /// re-compares and runs episodes until nothing is ahead.
    async fn driver(weak: Weak<Inner>, mut rx: mpsc::UnboundedReceiver<NodeId>) {
        while let Some(_node) = rx.recv().await {
            // Coalesce bursts of updates into one comparison round.
            while rx.try_recv().is_ok() {}

            let Some(inner) = weak.upgrade() else { break };
            Self::run_rounds(&inner).await;
        }
        debug!("sync driver stopped");
    }

    /// Compare-and-retrieve until the local best has caught up with every
    /// retrieval candidate.
    async fn run_rounds(inner: &Arc<Inner>) {
        loop {
            // The store is the single source of truth for the local best;
            // re-read it every round rather than caching across episodes.
            let Some(local_best) = inner.store.best_suggested_block() else {
                return;
            };
            let local_number = local_best.number();

            Self::set_phase(inner, SyncPhase::Comparing);

            let (candidate, best_known) = {
                let peers = inner.peers.read();
                let best_known = peers
                    .values()
                    .filter_map(|e| e.session.head_number)
                    .max();
                let candidate = peers
                    .values()
                    .filter(|e| e.session.is_retrieval_candidate())
                    .filter(|e| e.session.head_number.unwrap_or(0) > local_number)
                    .max_by_key(|e| e.session.head_number.unwrap_or(0))
                    .map(|e| {
                        (
                            e.session.node_id,
                            e.session.head_number.unwrap_or(0),
                            e.client.clone(),
                        )
                    });
                (candidate, best_known)
            };

            match candidate {
                Some((node_id, target, client)) => {
                    Self::leave_synced(inner);
                    Self::run_episode(inner, node_id, target, client, local_best).await;
                    // Loop: re-read the (possibly advanced) best and
                    // re-compare against the remaining peers.
                }
                None => {
                    match best_known {
                        Some(best) if best <= local_number => Self::enter_synced(inner),
                        Some(_) => {
                            // Peers are ahead but all cooling; wait for a
                            // head refresh or a drop to trigger us again.
                        }
                        None => {
                            let phase = if inner.peers.read().is_empty() {
                                SyncPhase::Idle
                            } else {
                                SyncPhase::AwaitingPeerInfo
                            };
                            Self::set_phase(inner, phase);
                        }
                    }
                    return;
                }
            }
        }
    }

    /// One retrieval episode against one peer: header range, batch header
    /// validation, body fetch, full block validation, ascending insertion.
    /// Halts at the first failure; never propagates.
    async fn run_episode(
        inner: &Arc<Inner>,
        node_id: NodeId,
        target: u64,
        client: Arc<dyn PeerClient>,
        local_best: Block,
    ) {
        let episode = Uuid::new_v4();
        let local_number = local_best.number();
        let start_hash = local_best.hash();

        // The range starts at the local best itself: its header anchors the
        // batch, so the peer's first header must be a block we already have.
        let wanted = (target - local_number + 1).min(inner.config.max_headers_per_request);

        Self::set_phase(inner, SyncPhase::Retrieving);
        info!(
            %episode,
            peer = %node_id.short(),
            from = local_number,
            target,
            "retrieval episode started"
        );

        let headers = match Self::with_timeout(
            &inner.config,
            client.block_headers(start_hash, wanted, 0),
        )
        .await
        {
            Ok(headers) if headers.is_empty() => {
                Self::penalize(inner, node_id, "empty header range");
                return;
            }
            Ok(headers) => headers,
            Err(error) => {
                Self::penalize(inner, node_id, &format!("header range request: {error}"));
                return;
            }
        };

        if headers[0].hash() != start_hash {
            Self::penalize(inner, node_id, "header range does not anchor at local best");
            return;
        }

        // Every new header is validated against its predecessor before any
        // body is fetched; the first one's predecessor is the locally known
        // parent.
        let mut prev = local_best.header.clone();
        for header in &headers[1..] {
            if let Err(error) = inner.header_validator.validate(header, Some(&prev)) {
                Self::penalize(
                    inner,
                    node_id,
                    &format!("header {} failed validation: {error}", header.number),
                );
                return;
            }
            prev = header.clone();
        }

        let new_headers = &headers[1..];
        if new_headers.is_empty() {
            // The peer claimed to be ahead but served only our anchor.
            Self::penalize(inner, node_id, "peer served no headers beyond local best");
            return;
        }

        let hashes: Vec<Hash> = new_headers.iter().map(BlockHeader::hash).collect();
        let bodies = match Self::with_timeout(
            &inner.config,
            client.block_bodies(hashes),
        )
        .await
        {
            Ok(bodies) => bodies,
            Err(error) => {
                Self::penalize(inner, node_id, &format!("body request: {error}"));
                return;
            }
        };

        Self::set_phase(inner, SyncPhase::ValidatingAndInserting);

        // A short body response processes the prefix it covers.
        let mut inserted = 0u64;
        for (header, body) in new_headers.iter().zip(bodies) {
            let block = body.into_block(header.clone());

            if let Err(error) = inner.block_validator.validate(&block) {
                Self::penalize(
                    inner,
                    node_id,
                    &format!("block {} failed validation: {error}", block.number()),
                );
                return;
            }

            let number = block.number();
            if let Err(error) = inner.store.insert(block) {
                // Not attributable to the peer; most often a concurrent
                // episode already covered this range.
                warn!(%episode, number, %error, "store rejected block; episode halted");
                return;
            }
            inserted += 1;
        }

        if inserted == 0 {
            Self::penalize(inner, node_id, "peer served headers without bodies");
            return;
        }

        info!(%episode, peer = %node_id.short(), inserted, "retrieval episode complete");
    }
}

#[async_trait]
impl SyncApi for SyncManager {
    async fn add_peer(&self, peer: Arc<dyn PeerClient>) {
        let node_id = peer.node_id();
        debug!(peer = %node_id.short(), "peer added");

        {
            let mut peers = self.inner.peers.write();
            peers.insert(
                node_id,
                PeerEntry {
                    session: PeerSession::new(node_id),
                    client: peer,
                },
            );
        }

        {
            let phase = *self.inner.phase.read();
            if matches!(phase, SyncPhase::Idle | SyncPhase::Synced) {
                Self::set_phase(&self.inner, SyncPhase::AwaitingPeerInfo);
            }
        }

        if self.inner.started.load(Ordering::SeqCst) {
            Self::spawn_head_info(self.inner.clone(), node_id);
        }
    }

    async fn remove_peer(&self, node_id: NodeId) {
        let removed = self.inner.peers.write().remove(&node_id).is_some();
        if removed {
            debug!(peer = %node_id.short(), "peer removed");
            // The departed peer may have been the only one ahead.
            let _ = self.inner.trigger_tx.send(node_id);
        }
    }

    fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let rx = self
            .inner
            .trigger_rx
            .lock()
            .take()
            .expect("trigger receiver present until first start");
        tokio::spawn(Self::driver(Arc::downgrade(&self.inner), rx));

        let queued: Vec<NodeId> = self.inner.peers.read().keys().copied().collect();
        for node_id in queued {
            Self::spawn_head_info(self.inner.clone(), node_id);
        }
    }

    async fn notify_new_block(&self, block: Block, from: NodeId) {
        {
            let mut peers = self.inner.peers.write();
            if let Some(entry) = peers.get_mut(&from) {
                let is_newer = entry
                    .session
                    .head_number
                    .map_or(true, |known| block.number() > known);
                if is_newer {
                    entry.session.update_head(block.hash(), block.number());
                }
            }
        }

        // Fast path: a block extending the current best directly skips the
        // retrieval round-trip.
        if self.inner.started.load(Ordering::SeqCst) {
            if let Some(best) = self.inner.store.best_suggested_block() {
                if block.header.parent_hash == best.hash() {
                    match self
                        .inner
                        .block_validator
                        .validate_with_parent(&block, &best.header)
                    {
                        Ok(()) => {
                            let number = block.number();
                            if self.inner.store.insert(block).is_ok() {
                                debug!(peer = %from.short(), number, "announced block inserted");
                            }
                        }
                        Err(error) => {
                            Self::penalize(
                                &self.inner,
                                from,
                                &format!("announced block invalid: {error}"),
                            );
                        }
                    }
                }
            }
        }

        let _ = self.inner.trigger_tx.send(from);
    }

    fn synced_watch(&self) -> watch::Receiver<bool> {
        self.inner.synced_tx.subscribe()
    }

    fn phase(&self) -> SyncPhase {
        *self.inner.phase.read()
    }
}
