//! Reconciliation watchers.
//!
//! Watchers run after every commit, over the new state and the applied
//! transition records. A watcher owns its trigger memory: predicates are
//! edge-triggered, firing exactly once when they first become true, not on
//! every commit where they hold. Watchers never mutate the store; they only
//! issue outbound actions.

use std::collections::HashSet;

use agora_store::{GlobalState, StateTransition};
use agora_types::Hash;

use crate::traits::OutboundAction;

/// A post-commit observer issuing outbound protocol actions.
pub trait Watcher: Send {
    fn name(&self) -> &'static str;

    /// Re-evaluate after a commit. `applied` is the batch that just landed.
    fn evaluate(&mut self, state: &GlobalState, applied: &[StateTransition])
        -> Vec<OutboundAction>;
}

/// Fires when a greet record first collects enough cosignatures to satisfy
/// its LAO's trust threshold, and connects to every disclosed peer.
///
/// The greet message may already be actionable on arrival (signatures
/// carried in the envelope) or become actionable later when witness
/// messages add signatures; both paths funnel through here.
#[derive(Default)]
pub struct GreetWatcher {
    fired: HashSet<Hash>,
}

impl GreetWatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Watcher for GreetWatcher {
    fn name(&self) -> &'static str {
        "greet"
    }

    fn evaluate(
        &mut self,
        state: &GlobalState,
        applied: &[StateTransition],
    ) -> Vec<OutboundAction> {
        let mut candidates: Vec<Hash> = Vec::new();
        for transition in applied {
            match transition {
                StateTransition::AddGreeting { greeting } => {
                    candidates.push(greeting.message_id.clone());
                }
                StateTransition::AddGreetSignature { message_id, .. } => {
                    candidates.push(message_id.clone());
                }
                // a changed witness set can flip the predicate for every
                // greeting of that LAO
                StateTransition::UpdateLao { id, .. } => {
                    candidates.extend(state.greetings_for(id).map(|g| g.message_id.clone()));
                }
                _ => {}
            }
        }

        let mut actions = Vec::new();
        for message_id in candidates {
            if self.fired.contains(&message_id) {
                continue;
            }
            let Some(greeting) = state.greeting(&message_id) else {
                continue;
            };
            let Some(lao) = state.lao(&greeting.lao_id) else {
                continue;
            };
            if greeting.is_actionable(lao) {
                self.fired.insert(message_id.clone());
                tracing::info!(
                    greet = %message_id,
                    lao = %greeting.lao_id,
                    peers = greeting.peers.len(),
                    "greeting sufficiently cosigned, connecting to peers"
                );
                for peer in &greeting.peers {
                    actions.push(OutboundAction::ConnectToPeer(peer.clone()));
                }
            }
        }
        actions
    }
}
