//! Shared protocol-level error type.

use thiserror::Error;

/// Structural errors raised while validating wire data.
///
/// These cover the "schema" layer: a field is missing, malformed, or
/// inconsistent with the rest of the payload. Authenticity failures live in
/// `agora_messages::AuthError`; store invariants in `agora_store::StoreError`.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("missing '{0}' field")]
    MissingField(&'static str),

    #[error("invalid '{field}' field: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid base64url data: {0}")]
    InvalidEncoding(String),

    #[error("timestamp {0} lies too far in the future")]
    FutureTimestamp(crate::Timestamp),

    #[error("malformed JSON: {0}")]
    MalformedJson(String),
}
