//! The ingestion pipeline.
//!
//! Per frame: `Received → Decoded → AuthenticatedOrRejected →
//! RoutedOrUnknown → Applied|Discarded`. Every discard is local: the frame
//! is dropped with a diagnostic and processing continues. Once handling
//! starts it runs to a terminal outcome; there is no cancellation
//! mid-message.

use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::mpsc;

use agora_ledger::{TransactionPolicy, Trusting};
use agora_messages::data::{ActionType, ObjectType};
use agora_messages::{peek_route, Message};
use agora_store::GlobalState;
use agora_types::{ChannelId, PublicKey};

use crate::outcome::{HandlerOutcome, IngestOutcome};
use crate::registry::{HandlerContext, Registry};
use crate::stats::IngestStats;
use crate::traits::{Clock, ConnectionPool, OutboundAction};
use crate::watcher::{GreetWatcher, Watcher};

/// One channel-scoped payload handed over by the transport.
///
/// The pipeline does not interpret channel routing beyond reading the
/// LAO scope; subscription management lives with the transport.
#[derive(Clone, Debug)]
pub struct IncomingFrame {
    pub channel: ChannelId,
    pub payload: Vec<u8>,
}

/// The ingestion pipeline. Owns the store; everything mutates through it.
pub struct Pipeline {
    registry: Registry,
    state: GlobalState,
    watchers: Vec<Box<dyn Watcher>>,
    connections: Arc<dyn ConnectionPool>,
    clock: Arc<dyn Clock>,
    policy: Box<dyn TransactionPolicy>,
    own_key: Option<PublicKey>,
    stats: IngestStats,
}

impl Pipeline {
    /// Create a pipeline with the default watcher set and the trusting
    /// ledger policy.
    pub fn new(
        registry: Registry,
        connections: Arc<dyn ConnectionPool>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            state: GlobalState::new(),
            watchers: vec![Box::new(GreetWatcher::new())],
            connections,
            clock,
            policy: Box::new(Trusting),
            own_key: None,
            stats: IngestStats::default(),
        }
    }

    /// Substitute the ledger acceptance policy.
    pub fn set_policy(&mut self, policy: Box<dyn TransactionPolicy>) {
        self.policy = policy;
    }

    /// Set the client's own public key (enables reply notifications).
    pub fn set_own_key(&mut self, key: PublicKey) {
        self.own_key = Some(key);
    }

    /// Register an additional watcher.
    pub fn add_watcher(&mut self, watcher: Box<dyn Watcher>) {
        self.watchers.push(watcher);
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Consume frames until the transport closes the channel.
    ///
    /// Frames of one channel arrive in order on `frames` and are applied
    /// strictly sequentially; interleaving across organization channels
    /// happens upstream on the same single-threaded scheduler.
    pub async fn run(&mut self, mut frames: mpsc::Receiver<IncomingFrame>) {
        while let Some(frame) = frames.recv().await {
            self.ingest(frame).await;
        }
        tracing::info!("frame channel closed, pipeline stopping");
    }

    /// Process one frame to its terminal outcome.
    pub async fn ingest(&mut self, frame: IncomingFrame) -> IngestOutcome {
        let outcome = self.process(&frame).await;
        self.stats.record(&outcome);
        match &outcome {
            IngestOutcome::Applied(n) => {
                tracing::debug!(channel = %frame.channel, transitions = n, "message applied");
            }
            IngestOutcome::Duplicate => {
                tracing::debug!(channel = %frame.channel, "redelivered message, no-op");
            }
            IngestOutcome::Ignored => {
                tracing::debug!(channel = %frame.channel, "message ignored");
            }
            IngestOutcome::MalformedFrame(reason) => {
                tracing::warn!(channel = %frame.channel, %reason, "malformed frame discarded");
            }
            IngestOutcome::AuthFailed(err) => {
                tracing::warn!(channel = %frame.channel, error = %err, "unauthentic message discarded");
            }
            IngestOutcome::UnknownRoute { object, action } => {
                // expected for message kinds this build does not understand
                tracing::debug!(channel = %frame.channel, object, action, "no route, discarded");
            }
            IngestOutcome::SchemaError(reason) => {
                tracing::warn!(channel = %frame.channel, %reason, "schema check failed, discarded");
            }
            IngestOutcome::HandlerRejected(reason) => {
                tracing::warn!(channel = %frame.channel, %reason, "handler rejected message");
            }
            IngestOutcome::InvariantViolation(reason) => {
                tracing::error!(channel = %frame.channel, %reason, "store invariant violated — this is a bug");
            }
        }
        outcome
    }

    async fn process(&mut self, frame: &IncomingFrame) -> IngestOutcome {
        // 1. envelope parsing
        let message = match Message::parse(&frame.payload) {
            Ok(message) => message,
            Err(err) => return IngestOutcome::MalformedFrame(err.to_string()),
        };

        // 2. authenticity — no state mutation happens on failure
        if let Err(err) = message.verify() {
            return IngestOutcome::AuthFailed(err);
        }

        // 3. routing by the declared discriminants inside the payload
        let value = match message.data_json() {
            Ok(value) => value,
            Err(err) => return IngestOutcome::SchemaError(err.to_string()),
        };
        let (object_str, action_str) = match peek_route(&value) {
            Ok(route) => route,
            Err(err) => return IngestOutcome::SchemaError(err.to_string()),
        };
        let (object, action) = match (
            ObjectType::from_str(&object_str),
            ActionType::from_str(&action_str),
        ) {
            (Ok(object), Ok(action)) => (object, action),
            _ => {
                return IngestOutcome::UnknownRoute {
                    object: object_str,
                    action: action_str,
                }
            }
        };
        let Some(route) = self.registry.lookup(object, action) else {
            return IngestOutcome::UnknownRoute {
                object: object_str,
                action: action_str,
            };
        };

        // 4. schema-checked decoding
        let data = match (route.decoder)(&value) {
            Ok(data) => data,
            Err(err) => return IngestOutcome::SchemaError(err.to_string()),
        };

        // 5. handler
        let ctx = HandlerContext {
            state: &self.state,
            message: &message,
            data: &data,
            channel: &frame.channel,
            now: self.clock.now(),
            own_key: self.own_key.as_ref(),
            policy: self.policy.as_ref(),
        };
        let transitions = match (route.handler)(&ctx) {
            Ok(HandlerOutcome::Apply(transitions)) => transitions,
            Ok(HandlerOutcome::Duplicate) => return IngestOutcome::Duplicate,
            Ok(HandlerOutcome::Ignored) => return IngestOutcome::Ignored,
            Err(err) => return IngestOutcome::HandlerRejected(err.to_string()),
        };

        // 6. atomic commit
        let applied = match self.state.commit(transitions) {
            Ok(applied) => applied,
            Err(err) => return IngestOutcome::InvariantViolation(err.to_string()),
        };

        // 7. reconciliation watchers, then their outbound actions
        let mut actions: Vec<OutboundAction> = Vec::new();
        for watcher in &mut self.watchers {
            actions.extend(watcher.evaluate(&self.state, &applied));
        }
        for action in actions {
            self.dispatch_action(action).await;
        }

        IngestOutcome::Applied(applied.len())
    }

    async fn dispatch_action(&self, action: OutboundAction) {
        let result = match &action {
            OutboundAction::ConnectToPeer(address) => {
                self.connections.connect_to_peer(address).await
            }
            OutboundAction::Subscribe { lao_id, channel } => {
                self.connections.subscribe(lao_id, channel).await
            }
        };
        if let Err(err) = result {
            // outbound failures never affect the triggering message
            tracing::warn!(?action, error = %err, "outbound action failed");
        }
    }
}
