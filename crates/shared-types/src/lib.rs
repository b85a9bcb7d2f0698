//! # Shared Types Crate
//!
//! Core chain entities shared by every Cinder subsystem crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-subsystem chain types are defined here.
//! - **Identity by content**: blocks and headers are identified by their
//!   Keccak-256 content hash, never by reference or position.
//! - **Immutable once built**: entities carry no interior mutability; a header
//!   whose fields change is a different header.

pub mod entities;
pub mod hashing;

pub use entities::*;
pub use hashing::{
    compute_ommers_hash, compute_transactions_root, keccak256, EMPTY_OMMERS_HASH, EMPTY_ROOT,
};
