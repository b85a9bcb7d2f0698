//! Cross-crate integration scenarios.

pub mod sync_flow;
pub mod validation_flow;

use cinder_consensus::DifficultyCalculator;
use cinder_signature_verification::domain::ecdsa::test_helpers::{
    generate_keypair, sign_transaction,
};
use cinder_sync::test_utils::test_spec;
use shared_types::{Block, BlockHeader, Transaction, U256};

/// A signed transfer under the test chain id.
pub fn signed_transfer(nonce: u64) -> Transaction {
    let (key, _) = generate_keypair();
    let mut tx = Transaction {
        nonce,
        gas_price: U256::from(10u64),
        gas_limit: 30_000,
        to: Some([0xAA; 20]),
        value: U256::from(1_000u64),
        data: vec![1, 2, 3],
        signature: None,
    };
    sign_transaction(&mut tx, &key, test_spec().chain_id);
    tx
}

/// A consensus-valid child header of `parent`; `salt` varies the beneficiary
/// so competing children get distinct hashes.
pub fn child_header(parent: &BlockHeader, salt: u8) -> BlockHeader {
    let timestamp = parent.timestamp + 5;
    BlockHeader {
        parent_hash: parent.hash(),
        number: parent.number + 1,
        timestamp,
        difficulty: DifficultyCalculator::new(test_spec()).calculate(parent, timestamp),
        gas_limit: parent.gas_limit,
        beneficiary: [salt; 20],
        ..Default::default()
    }
}

/// A chain of `len` blocks where every block past genesis carries one signed
/// transaction, and the last block also carries a legal ommer.
pub fn rich_chain(len: usize) -> Vec<Block> {
    assert!(len >= 3, "rich chain needs room for an ommer");

    let genesis = BlockHeader {
        number: 0,
        timestamp: 1_000,
        difficulty: U256::from(131_072u64),
        gas_limit: 8_000_000,
        ..Default::default()
    };
    let mut blocks = vec![Block::new(genesis, vec![], vec![])];

    for n in 1..len {
        let parent = blocks.last().unwrap().header.clone();
        let ommers = if n == len - 1 {
            // A stale sibling of the block two generations back.
            let fork_parent = &blocks[n - 2].header;
            vec![child_header(fork_parent, 0x77)]
        } else {
            vec![]
        };
        let block = Block::new(
            child_header(&parent, 0),
            vec![signed_transfer(n as u64)],
            ommers,
        );
        blocks.push(block);
    }

    blocks
}
