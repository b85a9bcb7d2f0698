//! # Signature Errors

use thiserror::Error;

/// Errors that can occur during signature verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The transaction carries no signature at all.
    #[error("Missing signature")]
    MissingSignature,

    /// A signature component is out of range (zero, or >= curve order).
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has a high S value and is therefore malleable.
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// `v` is neither a legacy recovery id nor a chain-id-bearing one.
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u64),

    /// `v` carries an explicit chain id that is not this chain's.
    #[error("Chain id mismatch: signature carries {carried}, configured {configured}")]
    ChainIdMismatch {
        /// Chain id encoded in the signature's `v`.
        carried: u64,
        /// Chain id this validator was configured with.
        configured: u64,
    },

    /// Public key recovery failed; the signature does not correspond to any
    /// point for this digest.
    #[error("Failed to recover public key")]
    RecoveryFailed,
}
