//! The action registry: `(object, action)` -> `(decoder, handler)`.
//!
//! The full route set is fixed before any message is processed;
//! registration happens once at startup and a duplicate pair is a
//! configuration bug surfaced as a startup failure, never a runtime one.

use std::collections::HashMap;
use thiserror::Error;

use agora_ledger::TransactionPolicy;
use agora_messages::data::{ActionType, MessageData, ObjectType};
use agora_messages::Message;
use agora_store::records::LaoRecord;
use agora_store::GlobalState;
use agora_types::{ChannelId, Hash, ProtocolError, PublicKey, Timestamp};

use crate::outcome::{HandlerError, HandlerOutcome};

/// Everything a handler may look at. Handlers read the store; they never
/// write it — mutations travel back as transition records.
pub struct HandlerContext<'a> {
    pub state: &'a GlobalState,
    pub message: &'a Message,
    pub data: &'a MessageData,
    pub channel: &'a ChannelId,
    /// Current time from the clock collaborator, sampled once per frame.
    pub now: Timestamp,
    /// The client's own public key, when one is configured.
    pub own_key: Option<&'a PublicKey>,
    /// Ledger acceptance policy.
    pub policy: &'a dyn TransactionPolicy,
}

impl<'a> HandlerContext<'a> {
    /// The LAO id the frame's channel is scoped to.
    pub fn lao_id(&self) -> Result<Hash, HandlerError> {
        self.channel
            .lao_id()
            .ok_or_else(|| HandlerError::new(format!("channel {} is not LAO-scoped", self.channel)))
    }

    /// The LAO record for the frame's channel; rejects if none is known.
    pub fn lao(&self) -> Result<&'a LaoRecord, HandlerError> {
        let id = self.lao_id()?;
        self.state
            .lao(&id)
            .ok_or_else(|| HandlerError::new(format!("no known LAO with id {id}")))
    }
}

/// Decodes a JSON payload into the route's typed variant.
pub type Decoder = fn(&serde_json::Value) -> Result<MessageData, ProtocolError>;

/// Applies a verified, decoded message against the current store.
pub type Handler =
    Box<dyn Fn(&HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> + Send + Sync>;

/// One registered route.
pub struct Route {
    pub decoder: Decoder,
    pub handler: Handler,
}

/// Startup-time registry misconfiguration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate route {object}#{action}")]
    DuplicateRoute {
        object: ObjectType,
        action: ActionType,
    },
}

/// The routing table. Immutable after startup wiring.
#[derive(Default)]
pub struct Registry {
    routes: HashMap<(ObjectType, ActionType), Route>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. Fails if the pair is already taken.
    pub fn register(
        &mut self,
        object: ObjectType,
        action: ActionType,
        decoder: Decoder,
        handler: impl Fn(&HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError>
            + Send
            + Sync
            + 'static,
    ) -> Result<(), RegistryError> {
        if self.routes.contains_key(&(object, action)) {
            return Err(RegistryError::DuplicateRoute { object, action });
        }
        self.routes.insert(
            (object, action),
            Route {
                decoder,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Pure lookup; no side effects.
    pub fn lookup(&self, object: ObjectType, action: ActionType) -> Option<&Route> {
        self.routes.get(&(object, action))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_messages::data::{AddChirp, Payload};
    use agora_messages::decode_payload;
    use agora_types::Timestamp;

    fn chirp_decoder(value: &serde_json::Value) -> Result<MessageData, ProtocolError> {
        Ok(MessageData::ChirpAdd(decode_payload::<AddChirp>(value)?))
    }

    fn noop_handler(_ctx: &HandlerContext<'_>) -> Result<HandlerOutcome, HandlerError> {
        Ok(HandlerOutcome::Ignored)
    }

    #[test]
    fn register_then_lookup() {
        let mut registry = Registry::new();
        registry
            .register(
                AddChirp::OBJECT,
                AddChirp::ACTION,
                chirp_decoder,
                noop_handler,
            )
            .unwrap();
        assert!(registry.lookup(ObjectType::Chirp, ActionType::Add).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = Registry::new();
        registry
            .register(ObjectType::Chirp, ActionType::Add, chirp_decoder, noop_handler)
            .unwrap();
        let err = registry
            .register(ObjectType::Chirp, ActionType::Add, chirp_decoder, noop_handler)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateRoute {
                object: ObjectType::Chirp,
                action: ActionType::Add,
            }
        );
    }

    #[test]
    fn lookup_of_unregistered_pair_is_empty() {
        let registry = Registry::new();
        assert!(registry.lookup(ObjectType::Lao, ActionType::Create).is_none());
    }

    #[test]
    fn registered_decoder_is_usable() {
        let mut registry = Registry::new();
        registry
            .register(ObjectType::Chirp, ActionType::Add, chirp_decoder, noop_handler)
            .unwrap();
        let route = registry.lookup(ObjectType::Chirp, ActionType::Add).unwrap();
        let value = serde_json::json!({
            "object": "chirp",
            "action": "add",
            "text": "hi",
            "timestamp": Timestamp::new(1),
        });
        let decoded = (route.decoder)(&value).unwrap();
        assert!(matches!(decoded, MessageData::ChirpAdd(_)));
    }
}
