//! The global state container and its mutation rules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use agora_ledger::{CashState, LedgerError};
use agora_types::{Hash, PublicKey, Timestamp};

use crate::records::{ChirpRecord, EventKind, EventRecord, GreetRecord, LaoRecord, NotificationRecord};
use crate::transition::StateTransition;

/// Invariant violations raised while applying a transition.
///
/// The pipeline's authenticity and schema checks are expected to prevent
/// these in normal operation; hitting one means a handler produced a
/// transition the current state cannot absorb. They are surfaced loudly,
/// never silently swallowed, because a partial apply would corrupt the
/// derived indexes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate id {id} in {collection}")]
    DuplicateId { collection: &'static str, id: Hash },

    #[error("unknown {entity} {id}")]
    Missing { entity: &'static str, id: Hash },

    #[error("conflicting records for id {0}")]
    Conflict(Hash),
}

impl From<LedgerError> for StoreError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Conflict(id) => Self::Conflict(id),
        }
    }
}

/// Per-LAO social feed state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct SocialState {
    /// Chirp ids ordered newest first.
    all_ids_in_order: Vec<Hash>,
    by_id: HashMap<Hash, ChirpRecord>,
    /// Sender -> their chirp ids, newest first.
    by_user: HashMap<PublicKey, Vec<Hash>>,
    /// Chirp id -> codepoint -> senders who reacted.
    reactions_by_chirp: HashMap<Hash, HashMap<String, Vec<PublicKey>>>,
}

impl SocialState {
    fn insert_ordered(ids: &mut Vec<Hash>, by_id: &HashMap<Hash, ChirpRecord>, id: Hash, time: Timestamp) {
        if ids.contains(&id) {
            return;
        }
        let pos = ids.partition_point(|existing| {
            by_id
                .get(existing)
                .map(|chirp| chirp.time > time)
                .unwrap_or(false)
        });
        ids.insert(pos, id);
    }
}

/// Per-LAO event index; records themselves are in the global map because
/// event ids embed the LAO id and cannot collide across organizations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct EventsIndex {
    all_ids: Vec<Hash>,
}

/// Per-LAO notification state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct NotificationState {
    unread_ids: Vec<Hash>,
    read_ids: Vec<Hash>,
    by_id: HashMap<Hash, NotificationRecord>,
}

/// Process-wide normalized state.
///
/// Owned by the ingestion task; there is no interior mutability and no lock.
/// All writes go through [`GlobalState::commit`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GlobalState {
    /// LAO ids in the order they were first seen.
    lao_ids: Vec<Hash>,
    laos: HashMap<Hash, LaoRecord>,
    /// Greet records keyed by the greet message's id.
    greetings: HashMap<Hash, GreetRecord>,
    events: HashMap<Hash, EventsIndex>,
    events_by_id: HashMap<Hash, EventRecord>,
    /// Roll-call update ids -> owning event id.
    event_aliases: HashMap<Hash, Hash>,
    social: HashMap<Hash, SocialState>,
    notifications: HashMap<Hash, NotificationState>,
    cash: CashState,
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of transitions atomically.
    ///
    /// Either every transition is applied (in order, later ones seeing the
    /// effects of earlier ones) or the state is left untouched. Returns the
    /// applied records for watcher evaluation.
    pub fn commit(
        &mut self,
        transitions: Vec<StateTransition>,
    ) -> Result<Vec<StateTransition>, StoreError> {
        let mut next = self.clone();
        for transition in &transitions {
            next.apply(transition)?;
        }
        *self = next;
        Ok(transitions)
    }

    fn apply(&mut self, transition: &StateTransition) -> Result<(), StoreError> {
        match transition {
            StateTransition::AddLao { lao } => {
                if self.laos.contains_key(&lao.id) {
                    return Err(StoreError::DuplicateId {
                        collection: "laos",
                        id: lao.id.clone(),
                    });
                }
                self.lao_ids.push(lao.id.clone());
                self.laos.insert(lao.id.clone(), lao.clone());
            }
            StateTransition::UpdateLao {
                id,
                name,
                last_modified,
                witnesses,
            } => {
                let lao = self.laos.get_mut(id).ok_or_else(|| StoreError::Missing {
                    entity: "lao",
                    id: id.clone(),
                })?;
                lao.name = name.clone();
                lao.last_modified = *last_modified;
                lao.witnesses = witnesses.iter().cloned().collect();
            }
            StateTransition::AddServerAddress { lao_id, address } => {
                let lao = self.laos.get_mut(lao_id).ok_or_else(|| StoreError::Missing {
                    entity: "lao",
                    id: lao_id.clone(),
                })?;
                if !lao.server_addresses.contains(address) {
                    lao.server_addresses.push(address.clone());
                }
            }
            StateTransition::AddSubscribedChannel { lao_id, channel } => {
                let lao = self.laos.get_mut(lao_id).ok_or_else(|| StoreError::Missing {
                    entity: "lao",
                    id: lao_id.clone(),
                })?;
                lao.subscribed_channels.insert(channel.clone());
            }
            StateTransition::AddGreeting { greeting } => {
                if self.greetings.contains_key(&greeting.message_id) {
                    return Err(StoreError::DuplicateId {
                        collection: "greetings",
                        id: greeting.message_id.clone(),
                    });
                }
                self.greetings
                    .insert(greeting.message_id.clone(), greeting.clone());
            }
            StateTransition::AddGreetSignature { message_id, witness } => {
                let greeting =
                    self.greetings
                        .get_mut(message_id)
                        .ok_or_else(|| StoreError::Missing {
                            entity: "greeting",
                            id: message_id.clone(),
                        })?;
                greeting.collected_signatures.insert(witness.clone());
            }
            StateTransition::AddEvent { event } => {
                if self.events_by_id.contains_key(&event.id) {
                    return Err(StoreError::DuplicateId {
                        collection: "events",
                        id: event.id.clone(),
                    });
                }
                self.events
                    .entry(event.lao_id.clone())
                    .or_default()
                    .all_ids
                    .push(event.id.clone());
                self.index_event_alias(event);
                self.events_by_id.insert(event.id.clone(), event.clone());
            }
            StateTransition::UpdateEvent { event } => {
                if !self.events_by_id.contains_key(&event.id) {
                    return Err(StoreError::Missing {
                        entity: "event",
                        id: event.id.clone(),
                    });
                }
                self.index_event_alias(event);
                self.events_by_id.insert(event.id.clone(), event.clone());
            }
            StateTransition::AddChirp { lao_id, chirp } => {
                let social = self.social.entry(lao_id.clone()).or_default();
                // A tombstone from the same sender wins over a late add; an
                // add wins over a tombstone planted by someone else.
                let keep_existing = social
                    .by_id
                    .get(&chirp.id)
                    .is_some_and(|existing| existing.sender == chirp.sender);
                if !keep_existing {
                    social.by_id.insert(chirp.id.clone(), chirp.clone());
                }
                SocialState::insert_ordered(
                    &mut social.all_ids_in_order,
                    &social.by_id,
                    chirp.id.clone(),
                    chirp.time,
                );
                let user_ids = social.by_user.entry(chirp.sender.clone()).or_default();
                SocialState::insert_ordered(user_ids, &social.by_id, chirp.id.clone(), chirp.time);
            }
            StateTransition::DeleteChirp {
                lao_id,
                chirp_id,
                requester,
                time,
            } => {
                let social = self.social.entry(lao_id.clone()).or_default();
                let tombstone_time = social
                    .by_id
                    .get(chirp_id)
                    .map(|existing| existing.time)
                    .unwrap_or(*time);
                let may_delete = social
                    .by_id
                    .get(chirp_id)
                    .map(|existing| existing.sender == *requester)
                    // delete arriving before the add: keep the tombstone
                    .unwrap_or(true);
                if may_delete {
                    social.by_id.insert(
                        chirp_id.clone(),
                        ChirpRecord {
                            id: chirp_id.clone(),
                            sender: requester.clone(),
                            text: String::new(),
                            time: tombstone_time,
                            parent_id: None,
                            is_deleted: true,
                        },
                    );
                }
                // a delete by anyone else is ignored
            }
            StateTransition::AddReaction { lao_id, reaction } => {
                let social = self.social.entry(lao_id.clone()).or_default();
                let senders = social
                    .reactions_by_chirp
                    .entry(reaction.chirp_id.clone())
                    .or_default()
                    .entry(reaction.codepoint.clone())
                    .or_default();
                if !senders.contains(&reaction.sender) {
                    senders.push(reaction.sender.clone());
                }
            }
            StateTransition::AddNotification { notification } => {
                let state = self
                    .notifications
                    .entry(notification.lao_id.clone())
                    .or_default();
                if state.by_id.contains_key(&notification.id) {
                    return Err(StoreError::DuplicateId {
                        collection: "notifications",
                        id: notification.id.clone(),
                    });
                }
                state.unread_ids.push(notification.id.clone());
                state
                    .by_id
                    .insert(notification.id.clone(), notification.clone());
            }
            StateTransition::MarkNotificationRead {
                lao_id,
                notification_id,
            } => {
                let state =
                    self.notifications
                        .get_mut(lao_id)
                        .ok_or_else(|| StoreError::Missing {
                            entity: "lao notifications",
                            id: lao_id.clone(),
                        })?;
                let record =
                    state
                        .by_id
                        .get_mut(notification_id)
                        .ok_or_else(|| StoreError::Missing {
                            entity: "notification",
                            id: notification_id.clone(),
                        })?;
                if !record.has_been_read {
                    record.has_been_read = true;
                    state.unread_ids.retain(|id| id != notification_id);
                    state.read_ids.push(notification_id.clone());
                }
            }
            StateTransition::AddTransaction {
                lao_id,
                roll_call_id,
                transaction,
            } => {
                self.cash.record(lao_id, roll_call_id, transaction.clone())?;
            }
        }
        Ok(())
    }

    fn index_event_alias(&mut self, event: &EventRecord) {
        if let EventKind::RollCall {
            update_id: Some(update_id),
            ..
        } = &event.kind
        {
            self.event_aliases
                .insert(update_id.clone(), event.id.clone());
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn lao(&self, id: &Hash) -> Option<&LaoRecord> {
        self.laos.get(id)
    }

    /// LAOs in the order they were first seen.
    pub fn laos_in_order(&self) -> impl Iterator<Item = &LaoRecord> {
        self.lao_ids.iter().filter_map(|id| self.laos.get(id))
    }

    pub fn greeting(&self, message_id: &Hash) -> Option<&GreetRecord> {
        self.greetings.get(message_id)
    }

    /// All greet records of a LAO.
    pub fn greetings_for<'a>(&'a self, lao_id: &'a Hash) -> impl Iterator<Item = &'a GreetRecord> + 'a {
        self.greetings.values().filter(move |g| &g.lao_id == lao_id)
    }

    pub fn event(&self, id: &Hash) -> Option<&EventRecord> {
        self.events_by_id.get(id)
    }

    /// Resolve an event by its id or by one of its roll-call update ids.
    pub fn event_by_id_or_alias(&self, id: &Hash) -> Option<&EventRecord> {
        self.events_by_id
            .get(id)
            .or_else(|| self.event_aliases.get(id).and_then(|e| self.events_by_id.get(e)))
    }

    /// Events of a LAO in arrival order.
    pub fn events_for(&self, lao_id: &Hash) -> Vec<&EventRecord> {
        match self.events.get(lao_id) {
            Some(index) => index
                .all_ids
                .iter()
                .filter_map(|id| self.events_by_id.get(id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Chirps of a LAO, newest first, tombstones included.
    pub fn chirps_for(&self, lao_id: &Hash) -> Vec<&ChirpRecord> {
        match self.social.get(lao_id) {
            Some(social) => social
                .all_ids_in_order
                .iter()
                .filter_map(|id| social.by_id.get(id))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn chirp(&self, lao_id: &Hash, chirp_id: &Hash) -> Option<&ChirpRecord> {
        self.social.get(lao_id).and_then(|s| s.by_id.get(chirp_id))
    }

    /// Senders who reacted to a chirp with a codepoint.
    pub fn reactions(&self, lao_id: &Hash, chirp_id: &Hash, codepoint: &str) -> &[PublicKey] {
        self.social
            .get(lao_id)
            .and_then(|s| s.reactions_by_chirp.get(chirp_id))
            .and_then(|by_codepoint| by_codepoint.get(codepoint))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unread notifications of a LAO in arrival order.
    pub fn unread_notifications(&self, lao_id: &Hash) -> Vec<&NotificationRecord> {
        match self.notifications.get(lao_id) {
            Some(state) => state
                .unread_ids
                .iter()
                .filter_map(|id| state.by_id.get(id))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn notification(&self, lao_id: &Hash, id: &Hash) -> Option<&NotificationRecord> {
        self.notifications.get(lao_id).and_then(|s| s.by_id.get(id))
    }

    /// The digital-cash ledger.
    pub fn cash(&self) -> &CashState {
        &self.cash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{NotificationKind, ReactionRecord, RollCallStatus};
    use agora_ledger::{OutputRecord, TransactionRecord};
    use agora_types::ServerAddress;
    use std::collections::BTreeSet;

    fn key(k: u8) -> PublicKey {
        PublicKey::from_bytes([k; 32])
    }

    fn lao_id() -> Hash {
        Hash::from_digest([1; 32])
    }

    fn lao_record() -> LaoRecord {
        LaoRecord {
            id: lao_id(),
            name: "lao".into(),
            creation: Timestamp::new(1_000),
            last_modified: Timestamp::new(1_000),
            organizer: key(0),
            witnesses: BTreeSet::new(),
            server_addresses: vec![],
            subscribed_channels: BTreeSet::new(),
        }
    }

    fn chirp(id: u8, sender: u8, time: u64) -> ChirpRecord {
        ChirpRecord {
            id: Hash::from_digest([id; 32]),
            sender: key(sender),
            text: "hi".into(),
            time: Timestamp::new(time),
            parent_id: None,
            is_deleted: false,
        }
    }

    fn with_lao() -> GlobalState {
        let mut state = GlobalState::new();
        state
            .commit(vec![StateTransition::AddLao { lao: lao_record() }])
            .unwrap();
        state
    }

    // ── Commit semantics ────────────────────────────────────────────────

    #[test]
    fn commit_applies_all_or_nothing() {
        let mut state = GlobalState::new();
        let result = state.commit(vec![
            StateTransition::AddLao { lao: lao_record() },
            // second AddLao with the same id must fail the whole batch
            StateTransition::AddLao { lao: lao_record() },
        ]);
        assert!(result.is_err());
        assert!(state.lao(&lao_id()).is_none());
    }

    #[test]
    fn later_transitions_see_earlier_effects() {
        let mut state = GlobalState::new();
        state
            .commit(vec![
                StateTransition::AddLao { lao: lao_record() },
                StateTransition::AddServerAddress {
                    lao_id: lao_id(),
                    address: ServerAddress::new("wss://srv"),
                },
            ])
            .unwrap();
        assert_eq!(state.lao(&lao_id()).unwrap().server_addresses.len(), 1);
    }

    #[test]
    fn empty_commit_is_a_noop() {
        let mut state = GlobalState::new();
        assert!(state.commit(vec![]).unwrap().is_empty());
    }

    // ── LAO lifecycle ───────────────────────────────────────────────────

    #[test]
    fn duplicate_lao_is_an_invariant_violation() {
        let mut state = with_lao();
        let err = state
            .commit(vec![StateTransition::AddLao { lao: lao_record() }])
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateId {
                collection: "laos",
                id: lao_id()
            }
        );
    }

    #[test]
    fn update_lao_changes_mutable_fields_only() {
        let mut state = with_lao();
        state
            .commit(vec![StateTransition::UpdateLao {
                id: lao_id(),
                name: "renamed".into(),
                last_modified: Timestamp::new(2_000),
                witnesses: vec![key(3)],
            }])
            .unwrap();
        let lao = state.lao(&lao_id()).unwrap();
        assert_eq!(lao.name, "renamed");
        assert_eq!(lao.creation, Timestamp::new(1_000));
        assert!(lao.witnesses.contains(&key(3)));
    }

    #[test]
    fn update_unknown_lao_fails() {
        let mut state = GlobalState::new();
        let err = state
            .commit(vec![StateTransition::UpdateLao {
                id: lao_id(),
                name: "x".into(),
                last_modified: Timestamp::new(1),
                witnesses: vec![],
            }])
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "lao", .. }));
    }

    // ── Events ──────────────────────────────────────────────────────────

    fn roll_call_event(update_id: Option<Hash>) -> EventRecord {
        EventRecord {
            id: Hash::from_digest([10; 32]),
            lao_id: lao_id(),
            name: "rc".into(),
            created_at: Timestamp::new(1_100),
            start: Timestamp::new(1_200),
            end: None,
            kind: EventKind::RollCall {
                status: RollCallStatus::Created,
                update_id,
                attendees: vec![],
            },
        }
    }

    #[test]
    fn duplicate_event_id_is_an_invariant_violation() {
        let mut state = with_lao();
        state
            .commit(vec![StateTransition::AddEvent {
                event: roll_call_event(None),
            }])
            .unwrap();
        let err = state
            .commit(vec![StateTransition::AddEvent {
                event: roll_call_event(None),
            }])
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { collection: "events", .. }));
    }

    #[test]
    fn roll_call_update_id_resolves_to_event() {
        let mut state = with_lao();
        let update_id = Hash::from_digest([11; 32]);
        state
            .commit(vec![StateTransition::AddEvent {
                event: roll_call_event(None),
            }])
            .unwrap();
        state
            .commit(vec![StateTransition::UpdateEvent {
                event: roll_call_event(Some(update_id.clone())),
            }])
            .unwrap();
        let found = state.event_by_id_or_alias(&update_id).unwrap();
        assert_eq!(found.id, Hash::from_digest([10; 32]));
    }

    // ── Social feed ─────────────────────────────────────────────────────

    #[test]
    fn chirps_are_ordered_newest_first() {
        let mut state = with_lao();
        state
            .commit(vec![
                StateTransition::AddChirp { lao_id: lao_id(), chirp: chirp(1, 5, 100) },
                StateTransition::AddChirp { lao_id: lao_id(), chirp: chirp(2, 5, 300) },
                StateTransition::AddChirp { lao_id: lao_id(), chirp: chirp(3, 5, 200) },
            ])
            .unwrap();
        let times: Vec<u64> = state
            .chirps_for(&lao_id())
            .iter()
            .map(|c| c.time.as_secs())
            .collect();
        assert_eq!(times, vec![300, 200, 100]);
    }

    #[test]
    fn delete_by_sender_leaves_tombstone() {
        let mut state = with_lao();
        state
            .commit(vec![StateTransition::AddChirp {
                lao_id: lao_id(),
                chirp: chirp(1, 5, 100),
            }])
            .unwrap();
        state
            .commit(vec![StateTransition::DeleteChirp {
                lao_id: lao_id(),
                chirp_id: Hash::from_digest([1; 32]),
                requester: key(5),
                time: Timestamp::new(150),
            }])
            .unwrap();
        let stored = state.chirp(&lao_id(), &Hash::from_digest([1; 32])).unwrap();
        assert!(stored.is_deleted);
        assert!(stored.text.is_empty());
        // the tombstone keeps the original display time
        assert_eq!(stored.time, Timestamp::new(100));
    }

    #[test]
    fn delete_by_other_sender_is_ignored() {
        let mut state = with_lao();
        state
            .commit(vec![StateTransition::AddChirp {
                lao_id: lao_id(),
                chirp: chirp(1, 5, 100),
            }])
            .unwrap();
        state
            .commit(vec![StateTransition::DeleteChirp {
                lao_id: lao_id(),
                chirp_id: Hash::from_digest([1; 32]),
                requester: key(6),
                time: Timestamp::new(150),
            }])
            .unwrap();
        let stored = state.chirp(&lao_id(), &Hash::from_digest([1; 32])).unwrap();
        assert!(!stored.is_deleted);
    }

    #[test]
    fn delete_before_add_keeps_tombstone_for_same_sender() {
        let mut state = with_lao();
        state
            .commit(vec![StateTransition::DeleteChirp {
                lao_id: lao_id(),
                chirp_id: Hash::from_digest([1; 32]),
                requester: key(5),
                time: Timestamp::new(150),
            }])
            .unwrap();
        state
            .commit(vec![StateTransition::AddChirp {
                lao_id: lao_id(),
                chirp: chirp(1, 5, 100),
            }])
            .unwrap();
        let stored = state.chirp(&lao_id(), &Hash::from_digest([1; 32])).unwrap();
        assert!(stored.is_deleted);
        // the late add still makes the chirp visible in the ordered feed
        assert_eq!(state.chirps_for(&lao_id()).len(), 1);
    }

    #[test]
    fn repeated_reaction_by_same_sender_counts_once() {
        let mut state = with_lao();
        let reaction = ReactionRecord {
            id: Hash::from_digest([20; 32]),
            sender: key(5),
            codepoint: "👍".into(),
            chirp_id: Hash::from_digest([1; 32]),
            time: Timestamp::new(100),
        };
        state
            .commit(vec![
                StateTransition::AddReaction { lao_id: lao_id(), reaction: reaction.clone() },
                StateTransition::AddReaction { lao_id: lao_id(), reaction },
            ])
            .unwrap();
        assert_eq!(
            state
                .reactions(&lao_id(), &Hash::from_digest([1; 32]), "👍")
                .len(),
            1
        );
    }

    // ── Notifications ───────────────────────────────────────────────────

    fn notification(id: u8) -> NotificationRecord {
        NotificationRecord {
            id: Hash::from_digest([id; 32]),
            lao_id: lao_id(),
            title: "reply to your chirp".into(),
            timestamp: Timestamp::new(500),
            has_been_read: false,
            kind: NotificationKind::ChirpReply {
                chirp_id: Hash::from_digest([1; 32]),
            },
        }
    }

    #[test]
    fn notifications_start_unread() {
        let mut state = with_lao();
        state
            .commit(vec![StateTransition::AddNotification {
                notification: notification(30),
            }])
            .unwrap();
        assert_eq!(state.unread_notifications(&lao_id()).len(), 1);
    }

    #[test]
    fn marking_read_moves_notification() {
        let mut state = with_lao();
        state
            .commit(vec![StateTransition::AddNotification {
                notification: notification(30),
            }])
            .unwrap();
        state
            .commit(vec![StateTransition::MarkNotificationRead {
                lao_id: lao_id(),
                notification_id: Hash::from_digest([30; 32]),
            }])
            .unwrap();
        assert!(state.unread_notifications(&lao_id()).is_empty());
        assert!(state
            .notification(&lao_id(), &Hash::from_digest([30; 32]))
            .unwrap()
            .has_been_read);
    }

    // ── Ledger bridge ───────────────────────────────────────────────────

    #[test]
    fn transactions_flow_into_cash_state() {
        let mut state = with_lao();
        let roll_call = Hash::from_digest([40; 32]);
        let key_hash = Hash::from_digest([41; 32]);
        state
            .commit(vec![StateTransition::AddTransaction {
                lao_id: lao_id(),
                roll_call_id: roll_call.clone(),
                transaction: TransactionRecord {
                    transaction_id: Hash::from_digest([42; 32]),
                    inputs: vec![],
                    outputs: vec![OutputRecord {
                        value: 9,
                        public_key_hash: key_hash.clone(),
                    }],
                },
            }])
            .unwrap();
        assert_eq!(state.cash().balance(&lao_id(), &roll_call, &key_hash), 9);
    }
}
