//! # Validation Errors
//!
//! Every rejection names the check that failed. The sync layer uses these to
//! attribute bad data to the peer that served it; none of them is fatal to
//! the node.

use cinder_signature_verification::SignatureError;
use shared_types::{Hash, U256};
use thiserror::Error;

/// Header validation failures, in check order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Extra data exceeds the chain's bound.
    #[error("Extra data too long: {len} > {max}")]
    ExtraDataTooLong { len: usize, max: usize },

    /// Gas used exceeds the header's own gas limit.
    #[error("Gas used {used} exceeds gas limit {limit}")]
    GasUsedExceedsLimit { used: u64, limit: u64 },

    /// Difficulty of zero is never valid.
    #[error("Zero difficulty")]
    ZeroDifficulty,

    /// Genesis must be block zero.
    #[error("Genesis header has number {got}, expected 0")]
    GenesisWrongNumber { got: u64 },

    /// Genesis must not link to a parent.
    #[error("Genesis header has a non-zero parent hash")]
    GenesisWrongParent,

    /// The claimed parent hash does not match the supplied parent.
    #[error("Parent hash mismatch")]
    ParentHashMismatch { expected: Hash, got: Hash },

    /// Number is not parent number + 1.
    #[error("Wrong block number: expected {expected}, got {got}")]
    WrongNumber { expected: u64, got: u64 },

    /// Timestamp does not strictly increase over the parent.
    #[error("Timestamp not increasing: parent {parent}, got {got}")]
    TimestampNotIncreasing { parent: u64, got: u64 },

    /// Difficulty does not match the consensus recomputation.
    #[error("Wrong difficulty: expected {expected}, got {got}")]
    WrongDifficulty { expected: U256, got: U256 },

    /// The seal/proof-of-work does not check out.
    #[error("Invalid seal")]
    InvalidSeal,
}

/// Transaction validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// Gas limit below the transaction's intrinsic cost.
    #[error("Intrinsic gas too low: need {required}, have {got}")]
    IntrinsicGasTooLow { required: u64, got: u64 },

    /// `value + gas_price * gas_limit` overflows.
    #[error("Transaction cost overflows")]
    CostOverflow,

    /// Signature rejected.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Ommer validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OmmerError {
    /// More ommers than the chain allows.
    #[error("Too many ommers: {count} > {max}")]
    TooManyOmmers { count: usize, max: usize },

    /// The same ommer appears twice in one block.
    #[error("Duplicate ommer in block")]
    DuplicateOmmer { hash: Hash },

    /// An ommer equals the block's own parent.
    #[error("Ommer is the block's parent")]
    OmmerIsParent { hash: Hash },

    /// An ommer lies on the block's own ancestor path.
    #[error("Ommer is an ancestor of the block")]
    OmmerIsAncestor { hash: Hash },

    /// The ommer's parent is not an ancestor within the depth window.
    #[error("Ommer outside the allowed depth window")]
    OutsideWindow { hash: Hash },

    /// An ancestor inside the window already included this ommer.
    #[error("Ommer already included by an ancestor")]
    AlreadyIncluded { hash: Hash },

    /// The ommer's own header fails standalone validation.
    #[error("Invalid ommer header: {source}")]
    InvalidHeader { hash: Hash, source: HeaderError },
}

/// Whole-block validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockError {
    /// Recomputed transactions root differs from the header's.
    #[error("Transactions root mismatch")]
    TransactionsRootMismatch { expected: Hash, got: Hash },

    /// Recomputed ommers hash differs from the header's.
    #[error("Ommers hash mismatch")]
    OmmersHashMismatch { expected: Hash, got: Hash },

    /// A transaction in the body is invalid.
    #[error("Invalid transaction at index {index}: {source}")]
    Transaction {
        index: usize,
        source: TransactionError,
    },

    /// The ommer list is invalid.
    #[error(transparent)]
    Ommers(#[from] OmmerError),

    /// The block's own header is invalid against its parent.
    #[error(transparent)]
    Header(#[from] HeaderError),
}
