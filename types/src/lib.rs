//! Fundamental types for the agora protocol client.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: base64url wire text, content-address hashes, key material,
//! timestamps, and channel/server identifiers.

pub mod base64url;
pub mod channel;
pub mod error;
pub mod hash;
pub mod keys;
pub mod time;

pub use base64url::Base64UrlData;
pub use channel::{ChannelId, ServerAddress};
pub use error::ProtocolError;
pub use hash::Hash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use time::Timestamp;
