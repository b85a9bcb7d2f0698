//! # Block Validator
//!
//! The whole-block gate: body commitments, every transaction, and the ommer
//! list. Any failure rejects the block outright; there is no partial
//! acceptance.

use shared_types::{compute_ommers_hash, compute_transactions_root, Block, BlockHeader};
use tracing::debug;

use crate::error::BlockError;
use crate::header::HeaderValidator;
use crate::ommers::OmmersValidator;
use crate::transaction::TransactionValidator;

/// Validates full block bodies before they are proposed to the chain store.
#[derive(Clone)]
pub struct BlockValidator {
    transaction_validator: TransactionValidator,
    header_validator: HeaderValidator,
    ommers_validator: OmmersValidator,
}

impl BlockValidator {
    /// Create a validator from the three sub-validators.
    pub fn new(
        transaction_validator: TransactionValidator,
        header_validator: HeaderValidator,
        ommers_validator: OmmersValidator,
    ) -> Self {
        Self {
            transaction_validator,
            header_validator,
            ommers_validator,
        }
    }

    /// Validate the block body.
    ///
    /// Does not validate the block's own header against its parent; the sync
    /// layer does that where the parent is at hand. Ommer headers are fully
    /// re-validated via the ommers validator.
    pub fn validate(&self, block: &Block) -> Result<(), BlockError> {
        let result = self.run_checks(block);
        if let Err(ref error) = result {
            debug!(number = block.number(), %error, "block rejected");
        }
        result
    }

    /// Validate the header against `parent` first, then the body.
    pub fn validate_with_parent(
        &self,
        block: &Block,
        parent: &BlockHeader,
    ) -> Result<(), BlockError> {
        self.header_validator.validate(&block.header, Some(parent))?;
        self.validate(block)
    }

    /// Yes/no form of [`Self::validate`].
    pub fn is_valid(&self, block: &Block) -> bool {
        self.validate(block).is_ok()
    }

    fn run_checks(&self, block: &Block) -> Result<(), BlockError> {
        let transactions_root = compute_transactions_root(&block.transactions);
        if transactions_root != block.header.transactions_root {
            return Err(BlockError::TransactionsRootMismatch {
                expected: block.header.transactions_root,
                got: transactions_root,
            });
        }

        let ommers_hash = compute_ommers_hash(&block.ommers);
        if ommers_hash != block.header.ommers_hash {
            return Err(BlockError::OmmersHashMismatch {
                expected: block.header.ommers_hash,
                got: ommers_hash,
            });
        }

        for (index, tx) in block.transactions.iter().enumerate() {
            self.transaction_validator
                .validate(tx)
                .map_err(|source| BlockError::Transaction { index, source })?;
        }

        self.ommers_validator.validate(block)?;

        Ok(())
    }
}
