//! # Domain Entities
//!
//! Result types for signature verification.

use shared_types::Address;

use super::errors::SignatureError;

/// Result of recovering a transaction sender.
#[derive(Clone, Debug)]
pub struct RecoveryOutcome {
    /// Whether the signature is valid under the configured chain id.
    pub valid: bool,
    /// The recovered sender address, when recovery succeeded.
    pub sender: Option<Address>,
    /// Error details, when it did not.
    pub error: Option<SignatureError>,
}

impl RecoveryOutcome {
    /// Successful recovery.
    pub fn valid(sender: Address) -> Self {
        Self {
            valid: true,
            sender: Some(sender),
            error: None,
        }
    }

    /// Failed recovery.
    pub fn invalid(error: SignatureError) -> Self {
        Self {
            valid: false,
            sender: None,
            error: Some(error),
        }
    }
}

/// Aggregate result of a batch verification run.
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    /// True iff every item verified.
    pub all_valid: bool,
    /// Number of valid items.
    pub valid_count: usize,
    /// Number of invalid items.
    pub invalid_count: usize,
    /// Per-item outcomes, in input order.
    pub outcomes: Vec<RecoveryOutcome>,
}

impl BatchOutcome {
    /// Fold per-item outcomes into the aggregate.
    pub fn from_outcomes(outcomes: Vec<RecoveryOutcome>) -> Self {
        let valid_count = outcomes.iter().filter(|o| o.valid).count();
        let invalid_count = outcomes.len() - valid_count;
        Self {
            all_valid: invalid_count == 0,
            valid_count,
            invalid_count,
            outcomes,
        }
    }
}
