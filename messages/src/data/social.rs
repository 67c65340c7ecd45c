//! Social feed payloads: chirps and reactions.

use serde::{Deserialize, Serialize};

use agora_types::{Hash, ProtocolError, Timestamp};

use crate::data::{ActionType, ObjectType, Payload};

/// Maximum length of a chirp, in characters.
pub const MAX_CHIRP_CHARS: usize = 300;

/// A short post on a LAO's social feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddChirp {
    pub object: ObjectType,
    pub action: ActionType,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Hash>,
    pub timestamp: Timestamp,
}

impl AddChirp {
    pub fn new(text: impl Into<String>, parent_id: Option<Hash>, timestamp: Timestamp) -> Self {
        Self {
            object: ObjectType::Chirp,
            action: ActionType::Add,
            text: text.into(),
            parent_id,
            timestamp,
        }
    }
}

impl Payload for AddChirp {
    const OBJECT: ObjectType = ObjectType::Chirp;
    const ACTION: ActionType = ActionType::Add;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.text.chars().count() > MAX_CHIRP_CHARS {
            return Err(ProtocolError::InvalidField {
                field: "text",
                reason: format!("exceeds {MAX_CHIRP_CHARS} characters"),
            });
        }
        Ok(())
    }
}

/// Request to delete a previously posted chirp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteChirp {
    pub object: ObjectType,
    pub action: ActionType,
    pub chirp_id: Hash,
    pub timestamp: Timestamp,
}

impl Payload for DeleteChirp {
    const OBJECT: ObjectType = ObjectType::Chirp;
    const ACTION: ActionType = ActionType::Delete;
}

/// An emoji reaction to a chirp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddReaction {
    pub object: ObjectType,
    pub action: ActionType,
    pub reaction_codepoint: String,
    pub chirp_id: Hash,
    pub timestamp: Timestamp,
}

impl Payload for AddReaction {
    const OBJECT: ObjectType = ObjectType::Reaction;
    const ACTION: ActionType = ActionType::Add;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.reaction_codepoint.is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "reaction_codepoint",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chirp_within_limit_is_valid() {
        let chirp = AddChirp::new("hello agora", None, Timestamp::new(1_607_277_600));
        assert!(chirp.validate().is_ok());
    }

    #[test]
    fn oversized_chirp_rejected() {
        let chirp = AddChirp::new("x".repeat(301), None, Timestamp::new(1_607_277_600));
        assert!(chirp.validate().is_err());
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // 300 multi-byte characters are fine even though they exceed 300 bytes
        let chirp = AddChirp::new("é".repeat(300), None, Timestamp::new(1_607_277_600));
        assert!(chirp.validate().is_ok());
    }

    #[test]
    fn reply_chirp_carries_parent() {
        let parent = Hash::from_digest([1; 32]);
        let chirp = AddChirp::new("re", Some(parent.clone()), Timestamp::new(1));
        let json = serde_json::to_string(&chirp).unwrap();
        assert!(json.contains(&format!("\"parent_id\":\"{parent}\"")));
    }

    #[test]
    fn empty_reaction_rejected() {
        let reaction = AddReaction {
            object: ObjectType::Reaction,
            action: ActionType::Add,
            reaction_codepoint: String::new(),
            chirp_id: Hash::from_digest([1; 32]),
            timestamp: Timestamp::new(1),
        };
        assert!(reaction.validate().is_err());
    }
}
