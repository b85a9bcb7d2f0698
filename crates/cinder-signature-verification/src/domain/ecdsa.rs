//! # ECDSA Recovery (secp256k1)
//!
//! Pure domain logic for transaction signature verification.
//!
//! ## Security Notes
//!
//! - **Malleability**: S must be strictly less than half the curve order
//! - **Scalar range**: R and S must be in `[1, n-1]`
//! - **Constant-time range checks**: uses the `subtle` crate so comparison
//!   timing does not depend on the scalar values
//! - Uses the k256 crate for the curve arithmetic itself

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash, TransactionSignature};

use super::errors::SignatureError;
use subtle::{Choice, ConstantTimeEq};

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order (malleability bound).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// First `v` value that can carry a chain id (`chain_id * 2 + 35`).
const EIP155_V_OFFSET: u64 = 35;

/// Recover the sender address for `digest` under `chain_id`.
///
/// Checks performed, in order, short-circuiting on first failure:
/// 1. R in `[1, n-1]`
/// 2. S in `[1, n-1]`
/// 3. S in the lower half of the order (malleability)
/// 4. `v` parses as a legacy or matching chain-id-bearing recovery id
/// 5. public key recovery succeeds
pub fn recover_sender_address(
    digest: &Hash,
    signature: &TransactionSignature,
    chain_id: u64,
) -> Result<Address, SignatureError> {
    use zeroize::Zeroize;

    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }

    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }

    let recovery_id = parse_recovery_id(signature.v, chain_id)?;

    // Intermediate buffer is cleared on both paths.
    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);

    let sig = match Signature::from_slice(&sig_bytes) {
        Ok(s) => {
            sig_bytes.zeroize();
            s
        }
        Err(_) => {
            sig_bytes.zeroize();
            return Err(SignatureError::InvalidFormat);
        }
    };

    let recovered_key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Derive the account address from a public key: last 20 bytes of the
/// Keccak-256 of the uncompressed point without its 0x04 prefix.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    let mut hasher = Keccak256::new();
    hasher.update(&pubkey_slice[1..]); // Skip 0x04 prefix
    let hash = hasher.finalize();

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Parse `v` into a recovery id.
///
/// Accepted forms: bare 0/1, legacy 27/28, or `chain_id * 2 + 35/36`. A
/// chain-id-bearing `v` for a different chain is a [`SignatureError::ChainIdMismatch`].
pub fn parse_recovery_id(v: u64, chain_id: u64) -> Result<RecoveryId, SignatureError> {
    let id: u8 = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ if v >= EIP155_V_OFFSET => {
            let carried = (v - EIP155_V_OFFSET) / 2;
            if carried != chain_id {
                return Err(SignatureError::ChainIdMismatch {
                    carried,
                    configured: chain_id,
                });
            }
            ((v - EIP155_V_OFFSET) % 2) as u8
        }
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// True if `v` names an explicit chain id rather than a legacy recovery id.
pub fn carries_chain_id(v: u64) -> bool {
    v >= EIP155_V_OFFSET
}

/// Check that S sits in the lower half of the curve order, strictly.
///
/// Constant-time: the comparison runs in fixed time regardless of the
/// scalar's value.
pub fn is_low_s(s: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let s_byte = s[i];
        let h_byte = SECP256K1_HALF_ORDER[i];

        let not_decided = !(less | greater);
        let byte_less = Choice::from((s_byte < h_byte) as u8);
        let byte_greater = Choice::from((s_byte > h_byte) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less.into()
}

/// Check that a scalar is in `[1, n-1]`. Constant-time.
pub fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let s_byte = scalar[i];
        let n_byte = SECP256K1_ORDER[i];

        let not_decided = !(less | greater);
        let byte_less = Choice::from((s_byte < n_byte) as u8);
        let byte_greater = Choice::from((s_byte > n_byte) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    let not_zero = !is_zero;
    let valid = not_zero & less;
    valid.into()
}

/// `n - s`, used to build the malleable twin of a signature in tests.
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;
    use shared_types::Transaction;

    /// Generate a new ECDSA keypair.
    pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        (signing_key, verifying_key)
    }

    /// Sign a digest, normalizing to low S and a chain-id-bearing `v`.
    pub fn sign_digest(digest: &Hash, key: &SigningKey, chain_id: u64) -> TransactionSignature {
        let (sig, recid) = key
            .sign_prehash_recoverable(digest)
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        // Normalize S to the lower half; flipping S flips the recovery id.
        let mut id = recid.to_byte() as u64;
        if !is_low_s(&s) {
            s = invert_s(&s);
            id ^= 1;
        }

        TransactionSignature {
            v: chain_id * 2 + EIP155_V_OFFSET + id,
            r,
            s,
        }
    }

    /// Sign a transaction in place under `chain_id`.
    pub fn sign_transaction(tx: &mut Transaction, key: &SigningKey, chain_id: u64) {
        let digest = tx.signing_hash(chain_id);
        tx.signature = Some(sign_digest(&digest, key, chain_id));
    }

    /// The address a signing key's transactions recover to.
    pub fn address_of(key: &SigningKey) -> Address {
        address_from_pubkey(key.verifying_key())
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
