//! # Sync Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the synchronization manager.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Per-request timeout in seconds; expiry counts as a peer failure.
    pub request_timeout_secs: u64,

    /// Cap on headers requested in one range. Larger gaps are covered by
    /// consecutive episodes.
    pub max_headers_per_request: u64,

    /// Failures a peer may accumulate before it is dropped.
    pub max_peer_failures: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_headers_per_request: 512,
            max_peer_failures: 3,
        }
    }
}

impl SyncConfig {
    /// A config for tests: short timeout, small ranges.
    pub fn for_testing() -> Self {
        Self {
            request_timeout_secs: 2,
            max_headers_per_request: 16,
            max_peer_failures: 2,
        }
    }

    /// The request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
