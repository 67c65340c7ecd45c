//! Canonical message-data codec.
//!
//! Encoding must be deterministic for identical logical content: compact
//! JSON, fields in struct-declaration (wire) order. Hashing and signing both
//! operate on the encoded form, so any drift here breaks message identity
//! across implementations.

use serde_json::Value;

use agora_types::{Base64UrlData, ProtocolError};

use crate::data::{MessageData, Payload};

/// Encode a payload to canonical JSON wrapped in base64url text.
pub fn encode_message_data(data: &MessageData) -> Result<Base64UrlData, ProtocolError> {
    let json = match data {
        MessageData::LaoCreate(p) => serde_json::to_string(p),
        MessageData::LaoUpdateProperties(p) => serde_json::to_string(p),
        MessageData::LaoState(p) => serde_json::to_string(p),
        MessageData::LaoGreet(p) => serde_json::to_string(p),
        MessageData::MeetingCreate(p) => serde_json::to_string(p),
        MessageData::RollCallCreate(p) => serde_json::to_string(p),
        MessageData::RollCallOpen(p) => serde_json::to_string(p),
        MessageData::RollCallClose(p) => serde_json::to_string(p),
        MessageData::RollCallReopen(p) => serde_json::to_string(p),
        MessageData::ElectionSetup(p) => serde_json::to_string(p),
        MessageData::ElectionEnd(p) => serde_json::to_string(p),
        MessageData::ChirpAdd(p) => serde_json::to_string(p),
        MessageData::ChirpDelete(p) => serde_json::to_string(p),
        MessageData::ReactionAdd(p) => serde_json::to_string(p),
        MessageData::MessageWitness(p) => serde_json::to_string(p),
        MessageData::CoinPostTransaction(p) => serde_json::to_string(p),
    }
    .map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
    Ok(Base64UrlData::encode(json.as_bytes()))
}

/// Decode the base64url payload text back into a JSON value.
pub fn decode_data_json(data: &Base64UrlData) -> Result<Value, ProtocolError> {
    let bytes = data.decode()?;
    serde_json::from_slice(&bytes).map_err(|e| ProtocolError::MalformedJson(e.to_string()))
}

/// Read the `object` / `action` discriminant strings of a decoded payload.
///
/// Returns the raw strings so an unregistered route can be reported without
/// this build having to know it.
pub fn peek_route(value: &Value) -> Result<(String, String), ProtocolError> {
    let object = value
        .get("object")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingField("object"))?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingField("action"))?;
    Ok((object.to_owned(), action.to_owned()))
}

/// Decode and schema-check one typed payload from a JSON value.
pub fn decode_payload<T: Payload>(value: &Value) -> Result<T, ProtocolError> {
    let payload: T =
        serde_json::from_value(value.clone()).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
    payload.validate()?;
    Ok(payload)
}
