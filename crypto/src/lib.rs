//! Cryptographic primitives for the agora client.
//!
//! Content addressing (SHA-256 over length-prefixed parts, base64url output),
//! Ed25519 signing and verification, key generation, and the async [`Signer`]
//! seam for hardware-backed keys.

pub mod hash;
pub mod keys;
pub mod sign;
pub mod signer;

pub use hash::hash_parts;
pub use keys::{generate_keypair, keypair_from_seed, public_from_private};
pub use sign::{sign, verify};
pub use signer::{LocalSigner, Signer, SignerError};
