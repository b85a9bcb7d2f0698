//! Port traits: the sync API this crate exposes, and the peer/store
//! capabilities it requires from the host. Mock implementations live next to
//! the traits so every consumer tests against the same fakes.

pub mod inbound;
pub mod outbound;

pub use inbound::SyncApi;
pub use outbound::{ChainStore, InMemoryChainStore, MockPeer, PeerClient};
