//! Pure cryptographic domain logic: entities, errors, and the secp256k1
//! recovery machinery.

pub mod ecdsa;
pub mod entities;
pub mod errors;
