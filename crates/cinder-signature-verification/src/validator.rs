//! # Signature Validator
//!
//! The chain-id-configured entry point consumed by transaction validation
//! and the sync pipeline. Stateless apart from the chain id; safe to share
//! across threads.

use rayon::prelude::*;
use shared_types::{Address, Transaction};
use tracing::debug;

use crate::domain::ecdsa::{carries_chain_id, recover_sender_address};
use crate::domain::entities::{BatchOutcome, RecoveryOutcome};
use crate::domain::errors::SignatureError;

/// Validates transaction signatures under a fixed chain id.
#[derive(Debug, Clone, Copy)]
pub struct SignatureValidator {
    chain_id: u64,
}

impl SignatureValidator {
    /// Create a validator for `chain_id`.
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    /// The configured chain id.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// True iff the transaction's signature recovers to a sender under the
    /// configured chain id. Fails closed on a missing signature.
    pub fn validate(&self, tx: &Transaction) -> bool {
        self.recover_sender(tx).is_ok()
    }

    /// Recover the sender address, reporting why recovery failed otherwise.
    pub fn recover_sender(&self, tx: &Transaction) -> Result<Address, SignatureError> {
        let signature = tx.signature.as_ref().ok_or(SignatureError::MissingSignature)?;

        let digest = tx.signing_hash(self.chain_id);
        let result = recover_sender_address(&digest, signature, self.chain_id);

        if let Err(ref error) = result {
            debug!(
                v = signature.v,
                explicit_chain_id = carries_chain_id(signature.v),
                %error,
                "transaction signature rejected"
            );
        }

        result
    }

    /// Verify a batch of transactions in parallel. Used when a retrieved
    /// header range brings in whole bodies at once.
    pub fn validate_batch(&self, txs: &[Transaction]) -> BatchOutcome {
        let outcomes: Vec<RecoveryOutcome> = txs
            .par_iter()
            .map(|tx| match self.recover_sender(tx) {
                Ok(sender) => RecoveryOutcome::valid(sender),
                Err(error) => RecoveryOutcome::invalid(error),
            })
            .collect();

        BatchOutcome::from_outcomes(outcomes)
    }
}
