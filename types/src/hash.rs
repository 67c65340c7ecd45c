//! Content-address hashes.
//!
//! A [`Hash`] is the base64url rendering of a SHA-256 digest and doubles as
//! the identity of every protocol object (LAOs, events, messages,
//! transactions). Identical inputs always produce the identical hash; hashes
//! are never randomly generated. The digest computation itself lives in
//! `agora_crypto::hash_parts`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::base64url::Base64UrlData;
use crate::error::ProtocolError;

/// A content-address digest in base64url text form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash(Base64UrlData);

impl Hash {
    /// Wrap a 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(Base64UrlData::encode(&digest))
    }

    /// Parse a hash received on the wire, verifying the base64url encoding.
    pub fn new(text: impl Into<String>) -> Result<Self, ProtocolError> {
        Ok(Self(Base64UrlData::new(text)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The raw digest bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ProtocolError> {
        self.0.decode()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // first 8 chars are enough to identify an object in logs
        let s = self.0.as_str();
        write!(f, "Hash({})", &s[..s.len().min(8)])
    }
}
