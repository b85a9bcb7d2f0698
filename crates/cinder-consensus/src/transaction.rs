//! # Transaction Validator
//!
//! Structural well-formedness plus signature recovery. Pure with respect to
//! its input and the configured chain id.

use cinder_signature_verification::SignatureValidator;
use shared_types::{Transaction, U256};

use crate::chain_spec::ChainSpec;
use crate::error::TransactionError;

/// Validates one transaction against the chain's structural rules and its
/// signature scheme.
#[derive(Debug, Clone)]
pub struct TransactionValidator {
    spec: ChainSpec,
    signature_validator: SignatureValidator,
}

impl TransactionValidator {
    /// Create a validator; the signature validator carries the chain id.
    pub fn new(spec: ChainSpec, signature_validator: SignatureValidator) -> Self {
        Self {
            spec,
            signature_validator,
        }
    }

    /// Validate structure first, then the signature.
    pub fn validate(&self, tx: &Transaction) -> Result<(), TransactionError> {
        let required = self.intrinsic_gas(tx);
        if tx.gas_limit < required {
            return Err(TransactionError::IntrinsicGasTooLow {
                required,
                got: tx.gas_limit,
            });
        }

        // value + gas_price * gas_limit must be representable.
        let gas_cost = tx
            .gas_price
            .checked_mul(U256::from(tx.gas_limit))
            .ok_or(TransactionError::CostOverflow)?;
        tx.value
            .checked_add(gas_cost)
            .ok_or(TransactionError::CostOverflow)?;

        self.signature_validator.recover_sender(tx)?;
        Ok(())
    }

    /// Yes/no form of [`Self::validate`].
    pub fn is_valid(&self, tx: &Transaction) -> bool {
        self.validate(tx).is_ok()
    }

    fn intrinsic_gas(&self, tx: &Transaction) -> u64 {
        self.spec
            .intrinsic_gas_base
            .saturating_add(self.spec.intrinsic_gas_per_byte.saturating_mul(tx.data.len() as u64))
    }
}
