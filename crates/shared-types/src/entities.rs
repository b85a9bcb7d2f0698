//! # Core Domain Entities
//!
//! The chain data model: headers, transactions, and blocks, plus the small
//! primitive aliases they are built from.
//!
//! ## Clusters
//!
//! - **Chain**: [`Block`], [`BlockHeader`], [`Transaction`],
//!   [`TransactionSignature`]
//! - **Networking**: [`NodeId`]

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::hashing::{keccak256, u256_be, EMPTY_OMMERS_HASH, EMPTY_ROOT};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte account address (last 20 bytes of the Keccak-256 of the
/// uncompressed public key).
pub type Address = [u8; 20];

/// Block height in the chain.
pub type BlockNumber = u64;

/// Unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub [u8; 32]);

impl NodeId {
    /// Short hex form for log lines.
    pub fn short(&self) -> String {
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

// =============================================================================
// HEADERS
// =============================================================================

/// The header of a block: parent linkage, position, difficulty, content
/// roots, gas accounting, and the seal fields the proof-of-work commits to.
///
/// Headers are value objects compared by [`BlockHeader::hash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Hash of the parent block (creates the chain linkage).
    pub parent_hash: Hash,
    /// Hash commitment to the ommer list of this block.
    pub ommers_hash: Hash,
    /// Address credited with the block reward.
    pub beneficiary: Address,
    /// Merkle root of all transactions in the block.
    pub transactions_root: Hash,
    /// Block height; strictly parent height + 1.
    pub number: BlockNumber,
    /// Unix timestamp; strictly greater than the parent's.
    pub timestamp: u64,
    /// Consensus difficulty of this block.
    pub difficulty: U256,
    /// Gas ceiling for the block.
    pub gas_limit: u64,
    /// Gas consumed by the block's transactions.
    pub gas_used: u64,
    /// Arbitrary bounded payload chosen by the block producer.
    pub extra_data: Vec<u8>,
    /// Seal field: mix digest produced by the proof-of-work.
    pub mix_hash: Hash,
    /// Seal field: proof-of-work nonce.
    pub nonce: u64,
}

impl BlockHeader {
    /// Content hash identifying this header (seal fields included).
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode(true))
    }

    /// Digest of the header excluding the seal fields. This is the pre-image
    /// the proof-of-work commits to.
    pub fn seal_hash(&self) -> Hash {
        keccak256(&self.encode(false))
    }

    /// Canonical byte encoding used for hashing. Fixed field order,
    /// big-endian integers, length-prefixed extra data.
    fn encode(&self, with_seal: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(200 + self.extra_data.len());
        out.extend_from_slice(&self.parent_hash);
        out.extend_from_slice(&self.ommers_hash);
        out.extend_from_slice(&self.beneficiary);
        out.extend_from_slice(&self.transactions_root);
        out.extend_from_slice(&self.number.to_be_bytes());
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.extend_from_slice(&u256_be(&self.difficulty));
        out.extend_from_slice(&self.gas_limit.to_be_bytes());
        out.extend_from_slice(&self.gas_used.to_be_bytes());
        out.extend_from_slice(&(self.extra_data.len() as u64).to_be_bytes());
        out.extend_from_slice(&self.extra_data);
        if with_seal {
            out.extend_from_slice(&self.mix_hash);
            out.extend_from_slice(&self.nonce.to_be_bytes());
        }
        out
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// An ECDSA signature over a transaction's signing hash.
///
/// `v` carries the recovery id, either in the legacy 27/28 form or the
/// replay-protected `chain_id * 2 + 35/36` form.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    /// Recovery id, possibly chain-id bearing.
    pub v: u64,
    /// Signature scalar r.
    #[serde_as(as = "Bytes")]
    pub r: [u8; 32],
    /// Signature scalar s.
    #[serde_as(as = "Bytes")]
    pub s: [u8; 32],
}

/// A transaction as carried in a block body.
///
/// The sender is not a field: it is recovered from the signature, so a
/// transaction cannot claim an origin its signature does not prove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Transaction {
    /// Sender's nonce to prevent replay.
    pub nonce: u64,
    /// Price per unit of gas.
    pub gas_price: U256,
    /// Gas ceiling for this transaction.
    pub gas_limit: u64,
    /// Recipient address; `None` for contract creation.
    pub to: Option<Address>,
    /// Transferred value in base units.
    pub value: U256,
    /// Call data / init code.
    pub data: Vec<u8>,
    /// Signature; a transaction without one is structurally invalid.
    pub signature: Option<TransactionSignature>,
}

impl Transaction {
    /// Content hash of the full transaction, signature included.
    pub fn hash(&self) -> Hash {
        let mut out = self.encode_unsigned();
        if let Some(sig) = &self.signature {
            out.extend_from_slice(&sig.v.to_be_bytes());
            out.extend_from_slice(&sig.r);
            out.extend_from_slice(&sig.s);
        }
        keccak256(&out)
    }

    /// The digest the sender signed. Commits to the chain id so a signature
    /// cannot be replayed on another chain.
    pub fn signing_hash(&self, chain_id: u64) -> Hash {
        let mut out = self.encode_unsigned();
        out.extend_from_slice(&chain_id.to_be_bytes());
        keccak256(&out)
    }

    fn encode_unsigned(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.data.len());
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&u256_be(&self.gas_price));
        out.extend_from_slice(&self.gas_limit.to_be_bytes());
        match &self.to {
            Some(to) => {
                out.push(1);
                out.extend_from_slice(to);
            }
            None => out.push(0),
        }
        out.extend_from_slice(&u256_be(&self.value));
        out.extend_from_slice(&(self.data.len() as u64).to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

/// A full block: header plus ordered transactions and ommer headers.
/// Immutable once constructed; identity is the header's content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// Transactions in execution order.
    pub transactions: Vec<Transaction>,
    /// Ommer (uncle) headers included for partial reward credit.
    pub ommers: Vec<BlockHeader>,
}

impl Block {
    /// Build a block and stamp the header's content roots from the body.
    pub fn new(
        mut header: BlockHeader,
        transactions: Vec<Transaction>,
        ommers: Vec<BlockHeader>,
    ) -> Self {
        header.transactions_root = crate::hashing::compute_transactions_root(&transactions);
        header.ommers_hash = crate::hashing::compute_ommers_hash(&ommers);
        Self {
            header,
            transactions,
            ommers,
        }
    }

    /// Block identity: the header's content hash.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Block height.
    pub fn number(&self) -> BlockNumber {
        self.header.number
    }

    /// True if the header's roots match this body. A block failing this was
    /// assembled from mismatched parts and must never be validated further.
    pub fn roots_match(&self) -> bool {
        self.header.transactions_root
            == crate::hashing::compute_transactions_root(&self.transactions)
            && self.header.ommers_hash == crate::hashing::compute_ommers_hash(&self.ommers)
    }
}

/// The transactions and ommers of a block, as retrieved separately from its
/// header over the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockBody {
    /// Transactions in execution order.
    pub transactions: Vec<Transaction>,
    /// Ommer headers.
    pub ommers: Vec<BlockHeader>,
}

impl BlockBody {
    /// Pair the body with its header. No roots are recomputed here; whether
    /// header and body belong together is for validation to decide.
    pub fn into_block(self, header: BlockHeader) -> Block {
        Block {
            header,
            transactions: self.transactions,
            ommers: self.ommers,
        }
    }
}

impl From<&Block> for BlockBody {
    fn from(block: &Block) -> Self {
        Self {
            transactions: block.transactions.clone(),
            ommers: block.ommers.clone(),
        }
    }
}

/// Known-empty commitments, usable without allocating an empty list.
pub const EMPTY_TRANSACTIONS_ROOT: Hash = EMPTY_ROOT;
/// See [`EMPTY_TRANSACTIONS_ROOT`].
pub const EMPTY_OMMER_LIST_HASH: Hash = EMPTY_OMMERS_HASH;
