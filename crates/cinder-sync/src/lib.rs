//! # Chain Sync
//!
//! Peer-driven synchronization for Cinder: discover peer chain heads, pull
//! missing blocks, validate everything, and propose validated blocks to the
//! chain store.
//!
//! ## Architecture
//!
//! This crate is hexagonal:
//!
//! ```text
//! cinder-sync/
//! ├── domain/          # Peer sessions, sync phases, error taxonomy
//! ├── ports/           # SyncApi (inbound) + PeerClient/ChainStore (outbound)
//! ├── application/     # SyncManager orchestrating retrieval episodes
//! └── config.rs        # SyncConfig
//! ```
//!
//! ## Trust model
//!
//! All network input is untrusted. Nothing reaches the chain store without
//! passing the full validation pipeline, and a misbehaving peer can only
//! waste its own retrieval episode; it can never corrupt local state or
//! crash the manager.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use application::{StoreAncestry, SyncManager};
pub use config::SyncConfig;
pub use domain::{PeerRequestError, PeerSession, StoreError, SyncError, SyncPhase};
pub use ports::{ChainStore, InMemoryChainStore, MockPeer, PeerClient, SyncApi};
