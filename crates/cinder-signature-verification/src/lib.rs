//! # Signature Verification
//!
//! secp256k1 ECDSA verification and sender recovery for Cinder transactions.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure cryptographic logic, no I/O
//! - **Validator** (`validator.rs`): the chain-id-configured entry point the
//!   rest of the node consumes
//!
//! ## Security Notes
//!
//! - **Malleability**: signatures with a high S value are rejected
//! - **Replay protection**: chain-id-bearing `v` values must match the
//!   configured chain id; the signing digest itself also commits to it
//! - **Fails closed**: a missing or unparseable signature is invalid, never
//!   an error the caller might ignore

pub mod domain;
pub mod validator;

// Re-export public API
pub use domain::ecdsa::{address_from_pubkey, recover_sender_address};
pub use domain::entities::{BatchOutcome, RecoveryOutcome};
pub use domain::errors::SignatureError;
pub use validator::SignatureValidator;
