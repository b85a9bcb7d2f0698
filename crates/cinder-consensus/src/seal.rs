//! # Seal Checking
//!
//! The proof embedded in a header is validated behind the [`SealChecker`]
//! port so the pipeline is indifferent to the proof scheme. The default
//! adapter is the proof-of-work boundary check; tests use [`AcceptAllSeal`].

use sha3::{Digest, Keccak256};
use shared_types::{BlockHeader, Hash, U256};

/// Capability to judge a header's seal. Injected into the header validator.
pub trait SealChecker: Send + Sync {
    /// True iff the header's seal fields prove the work its difficulty
    /// demands.
    fn is_valid(&self, header: &BlockHeader) -> bool;
}

/// Proof-of-work boundary check.
///
/// The mix digest must recompute from the seal pre-image and nonce, and the
/// final work value must sit at or below `U256::MAX / difficulty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkSealChecker;

impl WorkSealChecker {
    /// Create a checker.
    pub fn new() -> Self {
        Self
    }

    /// Mix digest the header's nonce commits to.
    pub fn compute_mix(header: &BlockHeader) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(header.seal_hash());
        hasher.update(header.nonce.to_be_bytes());
        let out = hasher.finalize();
        let mut mix = [0u8; 32];
        mix.copy_from_slice(&out);
        mix
    }

    /// Final work value derived from the mix.
    pub fn compute_work_value(header: &BlockHeader) -> U256 {
        let mut hasher = Keccak256::new();
        hasher.update(Self::compute_mix(header));
        hasher.update(header.seal_hash());
        let out = hasher.finalize();
        U256::from_big_endian(&out)
    }

    /// Stamp a valid mix digest for the header's current nonce. The work
    /// boundary still has to be met; callers mine by bumping the nonce.
    pub fn seal(header: &mut BlockHeader) {
        header.mix_hash = Self::compute_mix(header);
    }

    /// Search nonces until the header seals, up to `max_iterations`.
    /// Intended for fixtures and low difficulties.
    pub fn mine(header: &mut BlockHeader, max_iterations: u64) -> bool {
        let checker = Self;
        for _ in 0..max_iterations {
            Self::seal(header);
            if checker.is_valid(header) {
                return true;
            }
            header.nonce = header.nonce.wrapping_add(1);
        }
        false
    }
}

impl SealChecker for WorkSealChecker {
    fn is_valid(&self, header: &BlockHeader) -> bool {
        if header.difficulty.is_zero() {
            return false;
        }
        if header.mix_hash != Self::compute_mix(header) {
            return false;
        }
        let target = U256::MAX / header.difficulty;
        Self::compute_work_value(header) <= target
    }
}

/// Accepts every seal. For tests and offline replay, where the work was
/// checked elsewhere or is irrelevant.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllSeal;

impl SealChecker for AcceptAllSeal {
    fn is_valid(&self, _header: &BlockHeader) -> bool {
        true
    }
}
