//! # Ommers Validator
//!
//! Legality of a block's ommer list: each ommer must be a valid header
//! hanging off the recent ancestor window, must not sit on the ancestor path
//! itself, and must not be claimed twice anywhere in the window.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use shared_types::{Block, BlockHeader, Hash};
use tracing::debug;

use crate::chain_spec::ChainSpec;
use crate::error::OmmerError;
use crate::header::HeaderValidator;
use crate::ports::AncestryGateway;

/// Validates ommer lists against ancestry fetched through the
/// [`AncestryGateway`].
#[derive(Clone)]
pub struct OmmersValidator {
    spec: ChainSpec,
    ancestry: Arc<dyn AncestryGateway>,
    header_validator: HeaderValidator,
}

impl OmmersValidator {
    /// Create a validator.
    pub fn new(
        spec: ChainSpec,
        ancestry: Arc<dyn AncestryGateway>,
        header_validator: HeaderValidator,
    ) -> Self {
        Self {
            spec,
            ancestry,
            header_validator,
        }
    }

    /// Validate the block's ommer list. A block with zero ommers is valid.
    pub fn validate(&self, block: &Block) -> Result<(), OmmerError> {
        let result = self.run_checks(block);
        if let Err(ref error) = result {
            debug!(number = block.number(), %error, "ommer list rejected");
        }
        result
    }

    /// Yes/no form of [`Self::validate`].
    pub fn is_valid(&self, block: &Block) -> bool {
        self.validate(block).is_ok()
    }

    fn run_checks(&self, block: &Block) -> Result<(), OmmerError> {
        if block.ommers.len() > self.spec.max_ommer_count {
            return Err(OmmerError::TooManyOmmers {
                count: block.ommers.len(),
                max: self.spec.max_ommer_count,
            });
        }

        if block.ommers.is_empty() {
            return Ok(());
        }

        let window = self.collect_window(block);

        let mut seen: HashSet<Hash> = HashSet::new();
        for ommer in &block.ommers {
            let hash = ommer.hash();

            if !seen.insert(hash) {
                return Err(OmmerError::DuplicateOmmer { hash });
            }

            if hash == block.header.parent_hash {
                return Err(OmmerError::OmmerIsParent { hash });
            }

            if window.ancestors.contains_key(&hash) {
                return Err(OmmerError::OmmerIsAncestor { hash });
            }

            if window.included.contains(&hash) {
                return Err(OmmerError::AlreadyIncluded { hash });
            }

            // The ommer hangs off an ancestor inside the window, and is not
            // a sibling of the block itself.
            let ommer_parent = window
                .ancestors
                .get(&ommer.parent_hash)
                .filter(|_| ommer.number < block.header.number)
                .ok_or(OmmerError::OutsideWindow { hash })?;

            self.header_validator
                .validate(ommer, Some(ommer_parent))
                .map_err(|source| OmmerError::InvalidHeader { hash, source })?;
        }

        Ok(())
    }

    /// Walk up to `max_ommer_depth` generations from the block's parent,
    /// collecting the ancestor headers and every ommer those ancestors
    /// already claimed.
    fn collect_window(&self, block: &Block) -> AncestorWindow {
        let mut window = AncestorWindow::default();
        let mut cursor = block.header.parent_hash;

        for _ in 0..self.spec.max_ommer_depth {
            let Some(ancestor) = self.ancestry.block_by_hash(&cursor) else {
                break;
            };
            for included in &ancestor.ommers {
                window.included.insert(included.hash());
            }
            let at_genesis = ancestor.header.number == 0;
            cursor = ancestor.header.parent_hash;
            window.ancestors.insert(ancestor.hash(), ancestor.header);
            if at_genesis {
                break;
            }
        }

        window
    }
}

#[derive(Default)]
struct AncestorWindow {
    /// Ancestor headers by hash, parent-first.
    ancestors: HashMap<Hash, BlockHeader>,
    /// Ommers already claimed by ancestors inside the window.
    included: HashSet<Hash>,
}
