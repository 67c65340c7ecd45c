//! Message-data payloads and their routing discriminants.
//!
//! Every broadcast payload carries an `object` and an `action` field; the
//! pair selects the route. The payload structs declare their fields in wire
//! order — canonical encoding relies on struct declaration order, so the
//! order here IS the wire format.

pub mod coin;
pub mod election;
pub mod lao;
pub mod meeting;
pub mod roll_call;
pub mod social;
pub mod witness;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use agora_types::ProtocolError;

pub use coin::{InputScript, OutputScript, PostTransaction, Transaction, TxInput, TxOutput};
pub use election::{ElectionQuestion, EndElection, SetupElection};
pub use lao::{CreateLao, GreetLao, PeerAddress, StateLao, UpdateLao};
pub use meeting::CreateMeeting;
pub use roll_call::{CloseRollCall, CreateRollCall, OpenRollCall, ReopenRollCall};
pub use social::{AddChirp, AddReaction, DeleteChirp};
pub use witness::WitnessMessage;

/// Tags mixed into event-id hash preimages to separate the id spaces.
pub mod tags {
    pub const MEETING: &str = "M";
    pub const ROLL_CALL: &str = "R";
    pub const ELECTION: &str = "Election";
    pub const QUESTION: &str = "Question";
}

/// The `object` discriminant of a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Lao,
    Meeting,
    RollCall,
    Election,
    Chirp,
    Reaction,
    Message,
    Coin,
}

/// The `action` discriminant of a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    UpdateProperties,
    State,
    Greet,
    Open,
    Reopen,
    Close,
    Setup,
    End,
    Add,
    Delete,
    Witness,
    PostTransaction,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lao => "lao",
            Self::Meeting => "meeting",
            Self::RollCall => "roll_call",
            Self::Election => "election",
            Self::Chirp => "chirp",
            Self::Reaction => "reaction",
            Self::Message => "message",
            Self::Coin => "coin",
        }
    }
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::UpdateProperties => "update_properties",
            Self::State => "state",
            Self::Greet => "greet",
            Self::Open => "open",
            Self::Reopen => "reopen",
            Self::Close => "close",
            Self::Setup => "setup",
            Self::End => "end",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Witness => "witness",
            Self::PostTransaction => "post_transaction",
        }
    }
}

impl FromStr for ObjectType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lao" => Ok(Self::Lao),
            "meeting" => Ok(Self::Meeting),
            "roll_call" => Ok(Self::RollCall),
            "election" => Ok(Self::Election),
            "chirp" => Ok(Self::Chirp),
            "reaction" => Ok(Self::Reaction),
            "message" => Ok(Self::Message),
            "coin" => Ok(Self::Coin),
            _ => Err(()),
        }
    }
}

impl FromStr for ActionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update_properties" => Ok(Self::UpdateProperties),
            "state" => Ok(Self::State),
            "greet" => Ok(Self::Greet),
            "open" => Ok(Self::Open),
            "reopen" => Ok(Self::Reopen),
            "close" => Ok(Self::Close),
            "setup" => Ok(Self::Setup),
            "end" => Ok(Self::End),
            "add" => Ok(Self::Add),
            "delete" => Ok(Self::Delete),
            "witness" => Ok(Self::Witness),
            "post_transaction" => Ok(Self::PostTransaction),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed payload with a fixed route.
///
/// `validate` performs the structural checks that go beyond what serde can
/// express (non-empty names, ordered time ranges). Contextual checks that
/// need store state or a clock belong to the route's handler.
pub trait Payload: Serialize + DeserializeOwned {
    const OBJECT: ObjectType;
    const ACTION: ActionType;

    fn validate(&self) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// The closed set of payloads this client build understands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageData {
    LaoCreate(CreateLao),
    LaoUpdateProperties(UpdateLao),
    LaoState(StateLao),
    LaoGreet(GreetLao),
    MeetingCreate(CreateMeeting),
    RollCallCreate(CreateRollCall),
    RollCallOpen(OpenRollCall),
    RollCallClose(CloseRollCall),
    RollCallReopen(ReopenRollCall),
    ElectionSetup(SetupElection),
    ElectionEnd(EndElection),
    ChirpAdd(AddChirp),
    ChirpDelete(DeleteChirp),
    ReactionAdd(AddReaction),
    MessageWitness(WitnessMessage),
    CoinPostTransaction(PostTransaction),
}

impl MessageData {
    pub fn object(&self) -> ObjectType {
        match self {
            Self::LaoCreate(_)
            | Self::LaoUpdateProperties(_)
            | Self::LaoState(_)
            | Self::LaoGreet(_) => ObjectType::Lao,
            Self::MeetingCreate(_) => ObjectType::Meeting,
            Self::RollCallCreate(_)
            | Self::RollCallOpen(_)
            | Self::RollCallClose(_)
            | Self::RollCallReopen(_) => ObjectType::RollCall,
            Self::ElectionSetup(_) | Self::ElectionEnd(_) => ObjectType::Election,
            Self::ChirpAdd(_) | Self::ChirpDelete(_) => ObjectType::Chirp,
            Self::ReactionAdd(_) => ObjectType::Reaction,
            Self::MessageWitness(_) => ObjectType::Message,
            Self::CoinPostTransaction(_) => ObjectType::Coin,
        }
    }

    pub fn action(&self) -> ActionType {
        match self {
            Self::LaoCreate(_) | Self::MeetingCreate(_) | Self::RollCallCreate(_) => {
                ActionType::Create
            }
            Self::LaoUpdateProperties(_) => ActionType::UpdateProperties,
            Self::LaoState(_) => ActionType::State,
            Self::LaoGreet(_) => ActionType::Greet,
            Self::RollCallOpen(_) => ActionType::Open,
            Self::RollCallClose(_) => ActionType::Close,
            Self::RollCallReopen(_) => ActionType::Reopen,
            Self::ElectionSetup(_) => ActionType::Setup,
            Self::ElectionEnd(_) => ActionType::End,
            Self::ChirpAdd(_) | Self::ReactionAdd(_) => ActionType::Add,
            Self::ChirpDelete(_) => ActionType::Delete,
            Self::MessageWitness(_) => ActionType::Witness,
            Self::CoinPostTransaction(_) => ActionType::PostTransaction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ObjectType::RollCall).unwrap(),
            "\"roll_call\""
        );
        assert_eq!(ObjectType::from_str("roll_call"), Ok(ObjectType::RollCall));
    }

    #[test]
    fn action_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ActionType::PostTransaction).unwrap(),
            "\"post_transaction\""
        );
        assert_eq!(
            ActionType::from_str("update_properties"),
            Ok(ActionType::UpdateProperties)
        );
    }

    #[test]
    fn unknown_discriminants_rejected() {
        assert!(ObjectType::from_str("consensus").is_err());
        assert!(ActionType::from_str("cast_vote").is_err());
    }
}
