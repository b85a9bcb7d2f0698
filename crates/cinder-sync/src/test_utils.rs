//! Fixtures shared by this crate's tests and the workspace test suite:
//! consensus-valid chains and a fully wired manager over any store.

use std::sync::Arc;

use cinder_consensus::{
    AcceptAllSeal, BlockValidator, ChainSpec, DifficultyCalculator, HeaderValidator,
    OmmersValidator, TransactionValidator,
};
use cinder_signature_verification::SignatureValidator;
use shared_types::{Block, BlockHeader, U256};

use crate::application::{StoreAncestry, SyncManager};
use crate::config::SyncConfig;
use crate::domain::SyncError;
use crate::ports::outbound::ChainStore;

/// The chain spec every fixture uses.
pub fn test_spec() -> ChainSpec {
    ChainSpec::for_testing()
}

/// A consensus-valid chain of `len` empty blocks starting at genesis.
/// Difficulties come from the real calculator; seals are left blank and
/// judged by [`AcceptAllSeal`].
pub fn build_chain(len: usize) -> Vec<Block> {
    let calculator = DifficultyCalculator::new(test_spec());
    let genesis = BlockHeader {
        number: 0,
        timestamp: 1_000,
        difficulty: U256::from(131_072u64),
        gas_limit: 8_000_000,
        ..Default::default()
    };

    let mut blocks = vec![Block::new(genesis, vec![], vec![])];
    for _ in 1..len {
        let parent = &blocks.last().unwrap().header;
        let timestamp = parent.timestamp + 5;
        let header = BlockHeader {
            parent_hash: parent.hash(),
            number: parent.number + 1,
            timestamp,
            difficulty: calculator.calculate(parent, timestamp),
            gas_limit: parent.gas_limit,
            ..Default::default()
        };
        blocks.push(Block::new(header, vec![], vec![]));
    }
    blocks
}

/// The validator pipeline wired over `store`, as the node composes it.
pub fn test_validators(store: Arc<dyn ChainStore>) -> (BlockValidator, HeaderValidator) {
    let spec = test_spec();
    let header_validator = HeaderValidator::new(
        spec.clone(),
        DifficultyCalculator::new(spec.clone()),
        Arc::new(AcceptAllSeal),
    );
    let ommers_validator = OmmersValidator::new(
        spec.clone(),
        Arc::new(StoreAncestry::new(store)),
        header_validator.clone(),
    );
    let transaction_validator =
        TransactionValidator::new(spec.clone(), SignatureValidator::new(spec.chain_id));
    let block_validator = BlockValidator::new(
        transaction_validator,
        header_validator.clone(),
        ommers_validator,
    );
    (block_validator, header_validator)
}

/// A manager over `store` with the standard test pipeline and test config.
pub fn test_manager(store: Arc<dyn ChainStore>) -> Result<SyncManager, SyncError> {
    let (block_validator, header_validator) = test_validators(store.clone());
    SyncManager::new(
        store,
        block_validator,
        header_validator,
        SyncConfig::for_testing(),
    )
}
