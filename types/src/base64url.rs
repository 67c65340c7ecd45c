//! Base64url wire text.
//!
//! Every binary value the protocol puts on the wire (message payloads, keys,
//! signatures, digests) travels as padded base64url text. `Base64UrlData`
//! guards the invariant that the contained string actually decodes.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProtocolError;

/// A validated, padded base64url string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Base64UrlData(String);

impl Base64UrlData {
    /// Encode raw bytes as base64url text.
    pub fn encode(bytes: &[u8]) -> Self {
        Self(URL_SAFE.encode(bytes))
    }

    /// Wrap an existing string, verifying it is valid base64url.
    pub fn new(text: impl Into<String>) -> Result<Self, ProtocolError> {
        let text = text.into();
        URL_SAFE
            .decode(&text)
            .map_err(|e| ProtocolError::InvalidEncoding(e.to_string()))?;
        Ok(Self(text))
    }

    /// Decode back to the raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ProtocolError> {
        URL_SAFE
            .decode(&self.0)
            .map_err(|e| ProtocolError::InvalidEncoding(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl TryFrom<String> for Base64UrlData {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Base64UrlData> for String {
    fn from(value: Base64UrlData) -> Self {
        value.0
    }
}

impl fmt::Display for Base64UrlData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Base64UrlData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Base64UrlData({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let data = Base64UrlData::encode(b"agora wire data");
        assert_eq!(data.decode().unwrap(), b"agora wire data");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(Base64UrlData::new("not!base64?").is_err());
    }

    #[test]
    fn accepts_url_safe_alphabet() {
        // '-' and '_' are the url-safe substitutes for '+' and '/'
        let data = Base64UrlData::new("MzEaazm7WJNRquKKkElVjPDLd-CpYijMEUYFcc6cGN4=").unwrap();
        assert_eq!(data.decode().unwrap().len(), 32);
    }

    #[test]
    fn serde_rejects_invalid_text() {
        let result: Result<Base64UrlData, _> = serde_json::from_str("\"###\"");
        assert!(result.is_err());
    }

    #[test]
    fn serde_roundtrip_is_transparent() {
        let data = Base64UrlData::encode(b"x");
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, format!("\"{data}\""));
        let back: Base64UrlData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
