//! Key material for protocol identities.
//!
//! Public keys and signatures are base64url text on the wire and are kept in
//! that form; byte access is on demand. The private key holds raw scalar
//! bytes, is never serialized, and zeroizes on drop.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::base64url::Base64UrlData;
use crate::error::ProtocolError;

/// An Ed25519 public key in base64url text form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(Base64UrlData);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Base64UrlData::encode(&bytes))
    }

    /// Parse a key received on the wire.
    pub fn new(text: impl Into<String>) -> Result<Self, ProtocolError> {
        Ok(Self(Base64UrlData::new(text)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The 32 raw key bytes. Fails if the encoded data has the wrong length.
    pub fn to_bytes(&self) -> Result<[u8; 32], ProtocolError> {
        let bytes = self.0.decode()?;
        bytes
            .try_into()
            .map_err(|_| ProtocolError::InvalidField {
                field: "public key",
                reason: "expected 32 bytes".into(),
            })
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.as_str();
        write!(f, "PublicKey({})", &s[..s.len().min(8)])
    }
}

/// A 32-byte Ed25519 private key (secret scalar).
///
/// Intentionally omits `Clone`, `Debug`, and serde support to prevent
/// accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

/// An Ed25519 signature in base64url text form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(Base64UrlData);

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(Base64UrlData::encode(&bytes))
    }

    pub fn new(text: impl Into<String>) -> Result<Self, ProtocolError> {
        Ok(Self(Base64UrlData::new(text)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The 64 raw signature bytes.
    pub fn to_bytes(&self) -> Result<[u8; 64], ProtocolError> {
        let bytes = self.0.decode()?;
        bytes
            .try_into()
            .map_err(|_| ProtocolError::InvalidField {
                field: "signature",
                reason: "expected 64 bytes".into(),
            })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.as_str();
        write!(f, "Signature({})", &s[..s.len().min(8)])
    }
}

/// An Ed25519 key pair (public + private).
///
/// Use `agora_crypto::generate_keypair()` or `agora_crypto::keypair_from_seed()`
/// to construct key pairs. This struct is intentionally just data.
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_byte_roundtrip() {
        let pk = PublicKey::from_bytes([7; 32]);
        assert_eq!(pk.to_bytes().unwrap(), [7; 32]);
    }

    #[test]
    fn short_public_key_rejected() {
        let pk = PublicKey::new(Base64UrlData::encode(b"short").to_string()).unwrap();
        assert!(pk.to_bytes().is_err());
    }

    #[test]
    fn signature_byte_roundtrip() {
        let sig = Signature::from_bytes([9; 64]);
        assert_eq!(sig.to_bytes().unwrap(), [9; 64]);
    }

    #[test]
    fn keys_order_deterministically() {
        let a = PublicKey::from_bytes([1; 32]);
        let b = PublicKey::from_bytes([2; 32]);
        // BTreeSet-based witness sets rely on a stable ordering
        assert!(a < b || b < a);
    }
}
