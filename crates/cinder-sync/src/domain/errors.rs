//! # Sync Errors
//!
//! Per-request and per-block failures stay inside the retrieval loop; only
//! construction-time misconfiguration is fatal to the manager.

use cinder_consensus::HeaderError;
use shared_types::Hash;
use thiserror::Error;

/// A single peer request that did not produce a usable answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PeerRequestError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Transport-level failure (disconnect, protocol error).
    #[error("Network error: {0}")]
    Network(String),

    /// The peer answered with nothing where data was required.
    #[error("Empty response")]
    EmptyResponse,
}

/// Chain store rejection of a proposed block.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The block's parent is not present; the store refuses orphans.
    #[error("Parent not present in store: {0:02x?}")]
    ParentNotFound(Hash),

    /// Any other store-side rejection.
    #[error("Store rejected block: {0}")]
    Rejected(String),
}

/// Manager-level failures. Everything except construction is contained.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// The chain store could not produce a genesis block at construction.
    #[error("Chain store has no genesis block")]
    MissingGenesis,

    /// The store's genesis block fails genesis-path validation.
    #[error("Genesis block rejected: {0}")]
    InvalidGenesis(#[from] HeaderError),
}
