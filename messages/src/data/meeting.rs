//! Meeting event payload.

use serde::{Deserialize, Serialize};

use agora_crypto::hash_parts;
use agora_types::{Hash, ProtocolError, Timestamp};

use crate::data::{tags, ActionType, ObjectType, Payload};

/// Data sent to create a meeting event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMeeting {
    pub object: ObjectType,
    pub action: ActionType,
    pub id: Hash,
    pub name: String,
    pub creation: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
}

impl CreateMeeting {
    /// Recompute the id this payload must carry for `lao_id`.
    pub fn expected_id(lao_id: &Hash, creation: Timestamp, name: &str) -> Hash {
        hash_parts(&[
            tags::MEETING,
            lao_id.as_str(),
            &creation.to_digest_string(),
            name,
        ])
    }
}

impl Payload for CreateMeeting {
    const OBJECT: ObjectType = ObjectType::Meeting;
    const ACTION: ActionType = ActionType::Create;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if let Some(end) = self.end {
            if end < self.creation {
                return Err(ProtocolError::InvalidField {
                    field: "end",
                    reason: "precedes creation".into(),
                });
            }
            if end < self.start {
                return Err(ProtocolError::InvalidField {
                    field: "end",
                    reason: "precedes start".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(end: Option<u64>) -> CreateMeeting {
        let lao_id = Hash::from_digest([7; 32]);
        let creation = Timestamp::new(1_600_000_000);
        CreateMeeting {
            object: ObjectType::Meeting,
            action: ActionType::Create,
            id: CreateMeeting::expected_id(&lao_id, creation, "standup"),
            name: "standup".into(),
            creation,
            location: None,
            start: Timestamp::new(1_600_000_100),
            end: end.map(Timestamp::new),
        }
    }

    #[test]
    fn open_ended_meeting_is_valid() {
        assert!(meeting(None).validate().is_ok());
    }

    #[test]
    fn end_before_start_rejected() {
        assert!(meeting(Some(1_600_000_050)).validate().is_err());
    }

    #[test]
    fn absent_location_is_omitted_from_wire() {
        let json = serde_json::to_string(&meeting(None)).unwrap();
        assert!(!json.contains("location"));
        assert!(!json.contains("end"));
    }

    #[test]
    fn id_depends_on_lao() {
        let creation = Timestamp::new(1_600_000_000);
        let a = CreateMeeting::expected_id(&Hash::from_digest([1; 32]), creation, "m");
        let b = CreateMeeting::expected_id(&Hash::from_digest([2; 32]), creation, "m");
        assert_ne!(a, b);
    }
}
