//! # Cinder Test Suite
//!
//! Unified test crate for cross-crate scenarios.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/       # Cross-crate flows
//!     ├── sync_flow.rs        # Peer-driven sync end to end
//!     └── validation_flow.rs  # Validation pipeline over a real store
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cinder-tests
//!
//! # By category
//! cargo test -p cinder-tests integration::sync_flow
//! cargo test -p cinder-tests integration::validation_flow
//! ```

#![allow(dead_code)]

pub mod integration;
