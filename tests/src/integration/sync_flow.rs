//! End-to-end synchronization scenarios: mock peers on one side, an
//! in-memory chain store on the other, the full validation pipeline in
//! between.

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use cinder_sync::test_utils::{build_chain, test_manager};
    use cinder_sync::{ChainStore, InMemoryChainStore, MockPeer, PeerClient, SyncApi, SyncPhase};
    use shared_types::{Block, NodeId};

    use crate::integration::rich_chain;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }

    fn peer(chain: &[Block], id: u8) -> Arc<MockPeer> {
        Arc::new(MockPeer::new(NodeId([id; 32]), chain.to_vec()))
    }

    #[tokio::test]
    async fn test_sync_from_genesis_matches_reference_traffic() {
        init_tracing();
        let chain = build_chain(4);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();

        let remote = peer(&chain, 1);
        manager.add_peer(remote.clone()).await;
        manager.start();
        manager.wait_synced().await;

        // One head-hash, one head-number, one range request for
        // (genesis, 4, 0); blocks 1..3 land ascending.
        assert_eq!(remote.counters.head_hash.load(Ordering::SeqCst), 1);
        assert_eq!(remote.counters.head_number.load(Ordering::SeqCst), 1);
        assert_eq!(
            remote.header_requests.read().as_slice(),
            &[(chain[0].hash(), 4, 0)]
        );
        assert_eq!(store.best_suggested_block().unwrap().number(), 3);
    }

    #[tokio::test]
    async fn test_sync_chain_with_transactions_and_ommers() {
        init_tracing();
        let chain = rich_chain(5);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();

        manager.add_peer(peer(&chain, 1)).await;
        manager.start();
        manager.wait_synced().await;

        assert_eq!(store.best_suggested_block().unwrap().number(), 4);
        let tip = store.block_by_number(4).unwrap();
        assert_eq!(tip.ommers.len(), 1);
        assert_eq!(tip.transactions.len(), 1);
        assert_eq!(tip, chain[4]);
    }

    #[tokio::test]
    async fn test_long_chain_syncs_across_multiple_episodes() {
        init_tracing();
        // Longer than max_headers_per_request, forcing consecutive episodes.
        let chain = build_chain(40);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();

        let remote = peer(&chain, 1);
        manager.add_peer(remote.clone()).await;
        manager.start();
        manager.wait_synced().await;

        assert_eq!(store.best_suggested_block().unwrap().number(), 39);
        assert!(remote.counters.headers.load(Ordering::SeqCst) >= 3);

        // Ranges were anchored at the advancing local best each time.
        let requests = remote.header_requests.read().clone();
        assert_eq!(requests[0].0, chain[0].hash());
        assert!(requests.len() >= 3);
    }

    #[tokio::test]
    async fn test_manager_targets_the_highest_peer_head() {
        init_tracing();
        let chain = build_chain(8);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();

        manager.add_peer(peer(&chain[..4], 1)).await;
        manager.add_peer(peer(&chain, 2)).await;
        manager.start();
        manager.wait_synced().await;

        assert_eq!(store.best_suggested_block().unwrap().number(), 7);
    }

    #[tokio::test]
    async fn test_body_failure_falls_back_to_healthy_peer() {
        init_tracing();
        let chain = build_chain(5);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();

        let mut broken = MockPeer::new(NodeId([1u8; 32]), chain.clone());
        broken.fail_body_requests = true;
        manager.add_peer(Arc::new(broken)).await;
        manager.add_peer(peer(&chain, 2)).await;
        manager.start();
        manager.wait_synced().await;

        assert_eq!(store.best_suggested_block().unwrap().number(), 4);
    }

    #[tokio::test]
    async fn test_invalid_batch_never_reaches_the_store() {
        init_tracing();
        let chain = build_chain(5);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();

        let mut liar = MockPeer::new(NodeId([1u8; 32]), chain.clone());
        liar.corrupt_headers = true;
        manager.add_peer(Arc::new(liar)).await;
        manager.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.len(), 1); // Genesis only
        assert!(!manager.is_synced());

        // The manager survives and an honest peer completes the job.
        manager.add_peer(peer(&chain, 2)).await;
        manager.wait_synced().await;
        assert_eq!(store.best_suggested_block().unwrap().number(), 4);
    }

    #[tokio::test]
    async fn test_removed_peer_no_longer_drives_sync() {
        init_tracing();
        let chain = build_chain(4);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();

        let remote = peer(&chain, 1);
        manager.add_peer(remote.clone()).await;
        manager.remove_peer(remote.node_id()).await;
        manager.start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(remote.counters.head_hash.load(Ordering::SeqCst), 0);
        assert_eq!(store.len(), 1);
        assert_eq!(manager.peer_count(), 0);
    }

    #[tokio::test]
    async fn test_announced_block_advances_best_without_retrieval() {
        init_tracing();
        let chain = build_chain(3);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();
        manager.start();

        let announcer = NodeId([5u8; 32]);
        manager.notify_new_block(chain[1].clone(), announcer).await;
        manager.notify_new_block(chain[2].clone(), announcer).await;

        assert_eq!(store.best_suggested_block().unwrap().number(), 2);
    }

    #[tokio::test]
    async fn test_synced_notification_fires_once_per_episode() {
        init_tracing();
        let chain = build_chain(4);
        let store = Arc::new(InMemoryChainStore::new(chain[0].clone()));
        let manager = test_manager(store.clone()).unwrap();
        let mut watch = manager.synced_watch();
        assert!(!*watch.borrow());

        manager.add_peer(peer(&chain, 1)).await;
        manager.start();

        watch.wait_for(|synced| *synced).await.unwrap();
        assert_eq!(manager.phase(), SyncPhase::Synced);

        // No further edges arrive while nothing changes.
        assert!(!watch.has_changed().unwrap());
    }
}
