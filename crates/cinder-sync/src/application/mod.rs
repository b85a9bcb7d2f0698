//! Application layer: the synchronization manager and its store adapters.

pub mod service;

pub use service::{StoreAncestry, SyncManager};
