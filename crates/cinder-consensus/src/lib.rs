//! # Consensus Validation
//!
//! The consensus rule pipeline for Cinder: difficulty recomputation, seal
//! checking, and the validators that stand between network input and the
//! chain store.
//!
//! ## Structure
//!
//! ```text
//! cinder-consensus/
//! ├── chain_spec.rs   # Chain-wide consensus parameters
//! ├── difficulty.rs   # DifficultyCalculator (pure)
//! ├── seal.rs         # SealChecker port + proof-of-work adapter
//! ├── transaction.rs  # TransactionValidator
//! ├── header.rs       # HeaderValidator
//! ├── ommers.rs       # OmmersValidator
//! ├── block.rs        # BlockValidator
//! ├── ports.rs        # AncestryGateway (chain lookups) + in-memory mock
//! └── error.rs        # Check-naming error taxonomy
//! ```
//!
//! Every validator reports *which* check failed; callers use that to score
//! and penalize the peer that sourced the data.

pub mod block;
pub mod chain_spec;
pub mod difficulty;
pub mod error;
pub mod header;
pub mod ommers;
pub mod ports;
pub mod seal;
pub mod transaction;

// Re-export public API
pub use block::BlockValidator;
pub use chain_spec::ChainSpec;
pub use difficulty::DifficultyCalculator;
pub use error::{BlockError, HeaderError, OmmerError, TransactionError};
pub use header::HeaderValidator;
pub use ommers::OmmersValidator;
pub use ports::{AncestryGateway, InMemoryAncestry};
pub use seal::{AcceptAllSeal, SealChecker, WorkSealChecker};
pub use transaction::TransactionValidator;
