//! Content-address hashing.
//!
//! Object and message identifiers are the SHA-256 digest of their defining
//! fields, concatenated in a fixed order with each part prefixed by its
//! decimal UTF-8 byte length. The length prefix makes the concatenation
//! injective: `["ab", "c"]` and `["a", "bc"]` digest differently.

use agora_types::Hash;
use sha2::{Digest, Sha256};

/// Compute the content-address hash of an ordered list of string parts.
///
/// Identical inputs in identical order always produce the identical hash.
pub fn hash_parts(parts: &[&str]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.len().to_string().as_bytes());
        hasher.update(part.as_bytes());
    }
    Hash::from_digest(hasher.finalize().into())
}
