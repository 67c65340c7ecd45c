//! Terminal outcomes of frame processing and handler-level results.

use thiserror::Error;

use agora_messages::AuthError;
use agora_store::StateTransition;

/// What a route handler decided about a verified, decoded message.
#[derive(Debug)]
pub enum HandlerOutcome {
    /// Apply these transitions atomically.
    Apply(Vec<StateTransition>),
    /// The message's effects are already in the store (transport redelivery).
    Duplicate,
    /// Nothing to do for this client (e.g. a witness signature for a message
    /// this build does not track). Not an error.
    Ignored,
}

/// A handler-level consistency failure. Discards the message with a
/// diagnostic; the pipeline keeps running.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Terminal outcome of processing one incoming frame.
///
/// Every variant except `InvariantViolation` is a normal, locally recovered
/// result: the frame is dropped (or applied) and processing continues with
/// the next one.
#[derive(Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Message verified, routed, handled; this many transitions committed.
    Applied(usize),
    /// Redelivered message whose effects were already present.
    Duplicate,
    /// Verified message that this client has no use for.
    Ignored,
    /// The frame could not be parsed into an envelope.
    MalformedFrame(String),
    /// The envelope failed identity or signature verification.
    AuthFailed(AuthError),
    /// No registered route for the payload's discriminants. Expected for
    /// message kinds this build does not understand.
    UnknownRoute { object: String, action: String },
    /// The payload failed schema validation for its route.
    SchemaError(String),
    /// The handler's own consistency checks failed.
    HandlerRejected(String),
    /// A transition violated a store invariant. The earlier pipeline stages
    /// should make this unreachable; treated as a bug and logged loudly.
    InvariantViolation(String),
}

impl IngestOutcome {
    /// Whether the frame changed (or already matched) the store.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied(_) | Self::Duplicate | Self::Ignored)
    }
}
