//! LAO lifecycle payloads: create, update, state broadcast, server greeting.

use serde::{Deserialize, Serialize};

use agora_crypto::hash_parts;
use agora_types::{Hash, ProtocolError, PublicKey, ServerAddress, Timestamp};

use crate::data::{ActionType, ObjectType, Payload};
use crate::envelope::WitnessSignature;

/// Request to create a new LAO.
///
/// The id is the content address of (organizer, creation, name).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLao {
    pub object: ObjectType,
    pub action: ActionType,
    pub id: Hash,
    pub name: String,
    pub creation: Timestamp,
    pub organizer: PublicKey,
    pub witnesses: Vec<PublicKey>,
}

impl CreateLao {
    pub fn new(
        name: impl Into<String>,
        creation: Timestamp,
        organizer: PublicKey,
        witnesses: Vec<PublicKey>,
    ) -> Self {
        let name = name.into();
        let id = Self::expected_id(&organizer, creation, &name);
        Self {
            object: ObjectType::Lao,
            action: ActionType::Create,
            id,
            name,
            creation,
            organizer,
            witnesses,
        }
    }

    /// Recompute the id this payload must carry.
    pub fn expected_id(organizer: &PublicKey, creation: Timestamp, name: &str) -> Hash {
        hash_parts(&[organizer.as_str(), &creation.to_digest_string(), name])
    }
}

impl Payload for CreateLao {
    const OBJECT: ObjectType = ObjectType::Lao;
    const ACTION: ActionType = ActionType::Create;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Request by the organizer to change a LAO's mutable properties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLao {
    pub object: ObjectType,
    pub action: ActionType,
    pub id: Hash,
    pub name: String,
    pub last_modified: Timestamp,
    pub witnesses: Vec<PublicKey>,
}

impl Payload for UpdateLao {
    const OBJECT: ObjectType = ObjectType::Lao;
    const ACTION: ActionType = ActionType::UpdateProperties;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Full LAO state broadcast by the server after a witnessed update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLao {
    pub object: ObjectType,
    pub action: ActionType,
    pub id: Hash,
    pub name: String,
    pub creation: Timestamp,
    pub last_modified: Timestamp,
    pub organizer: PublicKey,
    pub witnesses: Vec<PublicKey>,
    /// The message id of the update this state resulted from.
    pub modification_id: Hash,
    /// Witness signatures over the modification message.
    pub modification_signatures: Vec<WitnessSignature>,
}

impl Payload for StateLao {
    const OBJECT: ObjectType = ObjectType::Lao;
    const ACTION: ActionType = ActionType::State;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.last_modified < self.creation {
            return Err(ProtocolError::InvalidField {
                field: "last_modified",
                reason: "precedes creation".into(),
            });
        }
        Ok(())
    }
}

/// A peer entry disclosed by a greeting server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAddress {
    pub address: ServerAddress,
}

/// Handshake from a server: its identity, its own address, and its peers.
///
/// Not acted upon until enough cosigning signatures have accumulated on the
/// carrying message; that reconciliation is the greet watcher's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetLao {
    pub object: ObjectType,
    pub action: ActionType,
    pub lao: Hash,
    /// The public key the client used when creating/joining the LAO.
    pub frontend: PublicKey,
    /// The canonical address of the greeting server.
    pub address: ServerAddress,
    pub peers: Vec<PeerAddress>,
}

impl Payload for GreetLao {
    const OBJECT: ObjectType = ObjectType::Lao;
    const ACTION: ActionType = ActionType::Greet;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.address.as_str().is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "address",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
