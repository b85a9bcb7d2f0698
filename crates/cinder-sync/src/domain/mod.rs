//! Sync domain: peer sessions, the manager's phase, and the error taxonomy.

pub mod entities;
pub mod errors;

pub use entities::{PeerSession, SyncPhase};
pub use errors::{PeerRequestError, StoreError, SyncError};
