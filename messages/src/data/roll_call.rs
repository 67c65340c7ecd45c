//! Roll-call event payloads.
//!
//! A roll call moves through created → opened → closed (and may be
//! reopened). Closing records the attendee tokens that later scope the
//! digital-cash ledger and social identities.

use serde::{Deserialize, Serialize};

use agora_crypto::hash_parts;
use agora_types::{Hash, ProtocolError, PublicKey, Timestamp};

use crate::data::{tags, ActionType, ObjectType, Payload};

/// Data sent to create a roll-call event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRollCall {
    pub object: ObjectType,
    pub action: ActionType,
    pub id: Hash,
    pub name: String,
    pub creation: Timestamp,
    pub proposed_start: Timestamp,
    pub proposed_end: Timestamp,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateRollCall {
    pub fn expected_id(lao_id: &Hash, creation: Timestamp, name: &str) -> Hash {
        hash_parts(&[
            tags::ROLL_CALL,
            lao_id.as_str(),
            &creation.to_digest_string(),
            name,
        ])
    }
}

impl Payload for CreateRollCall {
    const OBJECT: ObjectType = ObjectType::RollCall;
    const ACTION: ActionType = ActionType::Create;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if self.proposed_end < self.proposed_start {
            return Err(ProtocolError::InvalidField {
                field: "proposed_end",
                reason: "precedes proposed_start".into(),
            });
        }
        Ok(())
    }
}

/// Data sent to open a roll call for attendance scanning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRollCall {
    pub object: ObjectType,
    pub action: ActionType,
    pub update_id: Hash,
    /// Id of the create (or close, when reopening) this open refers to.
    pub opens: Hash,
    pub opened_at: Timestamp,
}

impl OpenRollCall {
    pub fn expected_update_id(lao_id: &Hash, opens: &Hash, opened_at: Timestamp) -> Hash {
        hash_parts(&[
            tags::ROLL_CALL,
            lao_id.as_str(),
            opens.as_str(),
            &opened_at.to_digest_string(),
        ])
    }
}

impl Payload for OpenRollCall {
    const OBJECT: ObjectType = ObjectType::RollCall;
    const ACTION: ActionType = ActionType::Open;
}

/// Data sent to close a roll call, fixing the attendee set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseRollCall {
    pub object: ObjectType,
    pub action: ActionType,
    pub update_id: Hash,
    /// Id of the open this close refers to.
    pub closes: Hash,
    pub closed_at: Timestamp,
    /// Attendee proof-of-presence tokens, one public key each.
    pub attendees: Vec<PublicKey>,
}

impl CloseRollCall {
    pub fn expected_update_id(lao_id: &Hash, closes: &Hash, closed_at: Timestamp) -> Hash {
        hash_parts(&[
            tags::ROLL_CALL,
            lao_id.as_str(),
            closes.as_str(),
            &closed_at.to_digest_string(),
        ])
    }
}

impl Payload for CloseRollCall {
    const OBJECT: ObjectType = ObjectType::RollCall;
    const ACTION: ActionType = ActionType::Close;
}

/// Data sent to reopen a closed roll call. Same shape as an open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReopenRollCall {
    pub object: ObjectType,
    pub action: ActionType,
    pub update_id: Hash,
    pub opens: Hash,
    pub opened_at: Timestamp,
}

impl Payload for ReopenRollCall {
    const OBJECT: ObjectType = ObjectType::RollCall;
    const ACTION: ActionType = ActionType::Reopen;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_inverted_time_range() {
        let lao_id = Hash::from_digest([1; 32]);
        let creation = Timestamp::new(1_000);
        let rc = CreateRollCall {
            object: ObjectType::RollCall,
            action: ActionType::Create,
            id: CreateRollCall::expected_id(&lao_id, creation, "rc"),
            name: "rc".into(),
            creation,
            proposed_start: Timestamp::new(2_000),
            proposed_end: Timestamp::new(1_500),
            location: "EPFL".into(),
            description: None,
        };
        assert!(rc.validate().is_err());
    }

    #[test]
    fn open_update_id_binds_lao_and_target() {
        let opened_at = Timestamp::new(3_000);
        let opens = Hash::from_digest([9; 32]);
        let a = OpenRollCall::expected_update_id(&Hash::from_digest([1; 32]), &opens, opened_at);
        let b = OpenRollCall::expected_update_id(&Hash::from_digest([2; 32]), &opens, opened_at);
        assert_ne!(a, b);
    }

    #[test]
    fn close_serializes_attendees_in_order() {
        let close = CloseRollCall {
            object: ObjectType::RollCall,
            action: ActionType::Close,
            update_id: Hash::from_digest([3; 32]),
            closes: Hash::from_digest([4; 32]),
            closed_at: Timestamp::new(5_000),
            attendees: vec![PublicKey::from_bytes([1; 32]), PublicKey::from_bytes([2; 32])],
        };
        let json = serde_json::to_string(&close).unwrap();
        let reparsed: CloseRollCall = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed.attendees, close.attendees);
    }
}
