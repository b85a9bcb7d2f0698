//! # Content Hashing
//!
//! Keccak-256 helpers and the root commitments a header makes over its body.
//!
//! The transactions root is a binary Merkle tree over transaction hashes,
//! duplicating the last leaf on odd levels. The ommers hash is a flat digest
//! over the ommer header hashes in list order (the list is tiny and order
//! matters, so a tree buys nothing).

use sha3::{Digest, Keccak256};

use crate::entities::{Hash, Transaction, U256};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Root of an empty transaction list: Keccak-256 of the empty string.
pub const EMPTY_ROOT: Hash = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03,
    0xc0, 0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85,
    0xa4, 0x70,
];

/// Hash of an empty ommer list; same digest, distinct name at call sites.
pub const EMPTY_OMMERS_HASH: Hash = EMPTY_ROOT;

/// Big-endian 32-byte form of a U256.
pub fn u256_be(value: &U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Hash two tree nodes together.
fn hash_concat(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(left);
    hasher.update(right);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Merkle root over the transaction hashes.
///
/// Empty list yields [`EMPTY_ROOT`]; a single transaction is its own root;
/// odd levels duplicate the last node.
pub fn compute_transactions_root(transactions: &[Transaction]) -> Hash {
    if transactions.is_empty() {
        return EMPTY_ROOT;
    }

    let mut level: Vec<Hash> = transactions.iter().map(Transaction::hash).collect();

    while level.len() > 1 {
        let mut next_level = Vec::with_capacity((level.len() + 1) / 2);
        for chunk in level.chunks(2) {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left); // Duplicate last if odd
            next_level.push(hash_concat(left, right));
        }
        level = next_level;
    }

    level[0]
}

/// Flat commitment over the ommer headers in list order.
pub fn compute_ommers_hash(ommers: &[crate::entities::BlockHeader]) -> Hash {
    if ommers.is_empty() {
        return EMPTY_OMMERS_HASH;
    }

    let mut hasher = Keccak256::new();
    for ommer in ommers {
        hasher.update(ommer.hash());
    }
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}
