//! Domain records held by the store.
//!
//! Every record is keyed by a content-addressed id. Records are plain data;
//! the mutation rules live in `state`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use agora_types::{ChannelId, Hash, PublicKey, ServerAddress, Timestamp};

/// One organization, created by a `lao#create` message and never deleted
/// while the session is active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaoRecord {
    pub id: Hash,
    pub name: String,
    pub creation: Timestamp,
    pub last_modified: Timestamp,
    pub organizer: PublicKey,
    pub witnesses: BTreeSet<PublicKey>,
    /// Addresses of the servers known to carry this LAO.
    pub server_addresses: Vec<ServerAddress>,
    pub subscribed_channels: BTreeSet<ChannelId>,
}

impl LaoRecord {
    /// How many cosigners a greeting needs beyond the organizer.
    ///
    /// Half of the declared witnesses, rounded up. With no witnesses the
    /// organizer's signature alone is sufficient.
    pub fn witness_threshold(&self) -> usize {
        self.witnesses.len().div_ceil(2)
    }
}

/// A server handshake awaiting enough cosignatures to be acted upon.
///
/// Created when a `lao#greet` message first arrives; grows as witness
/// signatures arrive on separate messages. The transition to "actionable"
/// is detected by the greet watcher, not by the handler appending the
/// signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetRecord {
    /// Id of the greet message itself (the witnesses sign this).
    pub message_id: Hash,
    pub lao_id: Hash,
    /// Key the greeting server signed the envelope with.
    pub server_key: PublicKey,
    pub address: ServerAddress,
    pub peers: Vec<ServerAddress>,
    pub collected_signatures: BTreeSet<PublicKey>,
}

impl GreetRecord {
    /// Whether the collected signatures satisfy a LAO's trust threshold.
    pub fn is_actionable(&self, lao: &LaoRecord) -> bool {
        if !self.collected_signatures.contains(&lao.organizer) {
            return false;
        }
        let witness_count = self
            .collected_signatures
            .iter()
            .filter(|key| lao.witnesses.contains(*key))
            .count();
        witness_count >= lao.witness_threshold()
    }
}

/// Lifecycle of a roll call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollCallStatus {
    Created,
    Opened,
    Closed,
}

/// Lifecycle of an election.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionStatus {
    Setup,
    Ended,
}

/// Feature-specific part of an event record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Meeting {
        location: Option<String>,
    },
    RollCall {
        status: RollCallStatus,
        /// Latest update id (set by open/reopen/close); later messages may
        /// reference the event through it.
        update_id: Option<Hash>,
        attendees: Vec<PublicKey>,
    },
    Election {
        status: ElectionStatus,
        question_count: usize,
    },
}

/// An event (meeting, roll call, election) within a LAO.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Hash,
    pub lao_id: Hash,
    pub name: String,
    pub created_at: Timestamp,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub kind: EventKind,
}

/// A social post. Deletion keeps a tombstone so the feed can show a
/// placeholder in place of the text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChirpRecord {
    /// The chirp's id is the id of the message that posted it.
    pub id: Hash,
    pub sender: PublicKey,
    pub text: String,
    pub time: Timestamp,
    pub parent_id: Option<Hash>,
    pub is_deleted: bool,
}

/// An emoji reaction to a chirp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub id: Hash,
    pub sender: PublicKey,
    pub codepoint: String,
    pub chirp_id: Hash,
    pub time: Timestamp,
}

/// What a notification is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Someone replied to one of the user's chirps.
    ChirpReply { chirp_id: Hash },
}

/// A user-facing notification, keyed by the id of the message that caused it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: Hash,
    pub lao_id: Hash,
    pub title: String,
    pub timestamp: Timestamp,
    pub has_been_read: bool,
    pub kind: NotificationKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: u8) -> PublicKey {
        PublicKey::from_bytes([k; 32])
    }

    fn lao_with_witnesses(witnesses: &[u8]) -> LaoRecord {
        LaoRecord {
            id: Hash::from_digest([1; 32]),
            name: "lao".into(),
            creation: Timestamp::new(1_000),
            last_modified: Timestamp::new(1_000),
            organizer: key(0),
            witnesses: witnesses.iter().map(|w| key(*w)).collect(),
            server_addresses: vec![],
            subscribed_channels: BTreeSet::new(),
        }
    }

    fn greet(signers: &[u8]) -> GreetRecord {
        GreetRecord {
            message_id: Hash::from_digest([2; 32]),
            lao_id: Hash::from_digest([1; 32]),
            server_key: key(9),
            address: ServerAddress::new("wss://srv"),
            peers: vec![],
            collected_signatures: signers.iter().map(|s| key(*s)).collect(),
        }
    }

    #[test]
    fn threshold_is_half_of_witnesses_rounded_up() {
        assert_eq!(lao_with_witnesses(&[]).witness_threshold(), 0);
        assert_eq!(lao_with_witnesses(&[1]).witness_threshold(), 1);
        assert_eq!(lao_with_witnesses(&[1, 2]).witness_threshold(), 1);
        assert_eq!(lao_with_witnesses(&[1, 2, 3]).witness_threshold(), 2);
    }

    #[test]
    fn organizer_alone_suffices_without_witnesses() {
        let lao = lao_with_witnesses(&[]);
        assert!(greet(&[0]).is_actionable(&lao));
        assert!(!greet(&[5]).is_actionable(&lao));
    }

    #[test]
    fn organizer_signature_is_required() {
        let lao = lao_with_witnesses(&[1, 2]);
        assert!(!greet(&[1, 2]).is_actionable(&lao));
        assert!(greet(&[0, 1]).is_actionable(&lao));
    }

    #[test]
    fn non_witness_signatures_do_not_count() {
        let lao = lao_with_witnesses(&[1, 2, 3]);
        // organizer + two strangers: threshold of 2 witnesses not met
        assert!(!greet(&[0, 7, 8]).is_actionable(&lao));
        assert!(greet(&[0, 1, 2]).is_actionable(&lao));
    }
}
