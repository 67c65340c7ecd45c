//! Protocol messages: data payloads, canonical codec, signed envelope.
//!
//! A [`data::MessageData`] value is the logical content of a broadcast. It is
//! encoded to canonical JSON, wrapped in base64url text, content-addressed,
//! and signed to form a [`Message`] envelope. The envelope is immutable once
//! constructed.

pub mod codec;
pub mod data;
pub mod envelope;

pub use codec::{decode_payload, encode_message_data, peek_route};
pub use data::{ActionType, MessageData, ObjectType, Payload};
pub use envelope::{AuthError, BuildError, Message, WitnessSignature};
