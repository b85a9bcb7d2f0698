//! # Header Validator
//!
//! Validates one header against its claimed parent: structure, linkage,
//! difficulty recomputation, then the seal. Checks run in order and stop at
//! the first failure so the error names the earliest broken rule.

use std::sync::Arc;

use shared_types::{BlockHeader, Hash};
use tracing::debug;

use crate::chain_spec::ChainSpec;
use crate::difficulty::DifficultyCalculator;
use crate::error::HeaderError;
use crate::seal::SealChecker;

const ZERO_HASH: Hash = [0u8; 32];

/// Validates headers against parent linkage and consensus rules.
#[derive(Clone)]
pub struct HeaderValidator {
    spec: ChainSpec,
    difficulty: DifficultyCalculator,
    seal: Arc<dyn SealChecker>,
}

impl HeaderValidator {
    /// Create a validator with an injected seal checker.
    pub fn new(spec: ChainSpec, difficulty: DifficultyCalculator, seal: Arc<dyn SealChecker>) -> Self {
        Self {
            spec,
            difficulty,
            seal,
        }
    }

    /// Validate `header`. `parent` may be absent only for the genesis
    /// header, which follows its own fixed-field path.
    pub fn validate(
        &self,
        header: &BlockHeader,
        parent: Option<&BlockHeader>,
    ) -> Result<(), HeaderError> {
        let result = self.run_checks(header, parent);
        if let Err(ref error) = result {
            debug!(number = header.number, %error, "header rejected");
        }
        result
    }

    /// Yes/no form of [`Self::validate`].
    pub fn is_valid(&self, header: &BlockHeader, parent: Option<&BlockHeader>) -> bool {
        self.validate(header, parent).is_ok()
    }

    fn run_checks(
        &self,
        header: &BlockHeader,
        parent: Option<&BlockHeader>,
    ) -> Result<(), HeaderError> {
        self.check_structure(header)?;

        let parent = match parent {
            None => return self.check_genesis(header),
            Some(parent) => parent,
        };

        if header.parent_hash != parent.hash() {
            return Err(HeaderError::ParentHashMismatch {
                expected: parent.hash(),
                got: header.parent_hash,
            });
        }

        if header.number != parent.number + 1 {
            return Err(HeaderError::WrongNumber {
                expected: parent.number + 1,
                got: header.number,
            });
        }

        if header.timestamp <= parent.timestamp {
            return Err(HeaderError::TimestampNotIncreasing {
                parent: parent.timestamp,
                got: header.timestamp,
            });
        }

        let expected = self.difficulty.calculate(parent, header.timestamp);
        if header.difficulty != expected {
            return Err(HeaderError::WrongDifficulty {
                expected,
                got: header.difficulty,
            });
        }

        if !self.seal.is_valid(header) {
            return Err(HeaderError::InvalidSeal);
        }

        Ok(())
    }

    fn check_structure(&self, header: &BlockHeader) -> Result<(), HeaderError> {
        if header.extra_data.len() > self.spec.max_extra_data_len {
            return Err(HeaderError::ExtraDataTooLong {
                len: header.extra_data.len(),
                max: self.spec.max_extra_data_len,
            });
        }

        if header.gas_used > header.gas_limit {
            return Err(HeaderError::GasUsedExceedsLimit {
                used: header.gas_used,
                limit: header.gas_limit,
            });
        }

        if header.difficulty.is_zero() {
            return Err(HeaderError::ZeroDifficulty);
        }

        Ok(())
    }

    /// Genesis path: block zero, no parent linkage, seal exempt.
    fn check_genesis(&self, header: &BlockHeader) -> Result<(), HeaderError> {
        if header.number != 0 {
            return Err(HeaderError::GenesisWrongNumber { got: header.number });
        }
        if header.parent_hash != ZERO_HASH {
            return Err(HeaderError::GenesisWrongParent);
        }
        Ok(())
    }
}
