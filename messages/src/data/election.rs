//! Election payloads: setup and end.
//!
//! Vote casting and tallying stay on the server side; the client ingests the
//! lifecycle markers so the event store can track election status.

use serde::{Deserialize, Serialize};

use agora_crypto::hash_parts;
use agora_types::{Hash, ProtocolError, Timestamp};

use crate::data::{tags, ActionType, ObjectType, Payload};

/// One question of an election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionQuestion {
    pub id: Hash,
    pub question: String,
    pub voting_method: String,
    pub ballot_options: Vec<String>,
    pub write_in: bool,
}

impl ElectionQuestion {
    pub fn expected_id(election_id: &Hash, question: &str) -> Hash {
        hash_parts(&[tags::QUESTION, election_id.as_str(), question])
    }
}

/// Data sent to set up an election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupElection {
    pub object: ObjectType,
    pub action: ActionType,
    pub version: String,
    pub id: Hash,
    pub lao: Hash,
    pub name: String,
    pub created_at: Timestamp,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub questions: Vec<ElectionQuestion>,
}

impl SetupElection {
    pub fn expected_id(lao_id: &Hash, created_at: Timestamp, name: &str) -> Hash {
        hash_parts(&[
            tags::ELECTION,
            lao_id.as_str(),
            &created_at.to_digest_string(),
            name,
        ])
    }
}

impl Payload for SetupElection {
    const OBJECT: ObjectType = ObjectType::Election;
    const ACTION: ActionType = ActionType::Setup;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if self.end_time < self.start_time {
            return Err(ProtocolError::InvalidField {
                field: "end_time",
                reason: "precedes start_time".into(),
            });
        }
        if self.questions.is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "questions",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Data sent to end an election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndElection {
    pub object: ObjectType,
    pub action: ActionType,
    pub election: Hash,
    pub lao: Hash,
    pub created_at: Timestamp,
    /// Hash over the ids of every registered vote.
    pub registered_votes: Hash,
}

impl Payload for EndElection {
    const OBJECT: ObjectType = ObjectType::Election;
    const ACTION: ActionType = ActionType::End;
}
