//! Named state-transition records.
//!
//! Handlers return these; `GlobalState::commit` is the only code that
//! consumes them. Each variant names one discrete mutation so diagnostics
//! and watcher evaluation can refer to transitions by name.

use agora_ledger::TransactionRecord;
use agora_types::{ChannelId, Hash, PublicKey, ServerAddress, Timestamp};

use crate::records::{
    ChirpRecord, EventRecord, GreetRecord, LaoRecord, NotificationRecord, ReactionRecord,
};

/// One discrete mutation of the global state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateTransition {
    AddLao {
        lao: LaoRecord,
    },
    UpdateLao {
        id: Hash,
        name: String,
        last_modified: Timestamp,
        witnesses: Vec<PublicKey>,
    },
    AddServerAddress {
        lao_id: Hash,
        address: ServerAddress,
    },
    AddSubscribedChannel {
        lao_id: Hash,
        channel: ChannelId,
    },
    AddGreeting {
        greeting: GreetRecord,
    },
    AddGreetSignature {
        message_id: Hash,
        witness: PublicKey,
    },
    AddEvent {
        event: EventRecord,
    },
    UpdateEvent {
        event: EventRecord,
    },
    AddChirp {
        lao_id: Hash,
        chirp: ChirpRecord,
    },
    DeleteChirp {
        lao_id: Hash,
        chirp_id: Hash,
        requester: PublicKey,
        time: Timestamp,
    },
    AddReaction {
        lao_id: Hash,
        reaction: ReactionRecord,
    },
    AddNotification {
        notification: NotificationRecord,
    },
    MarkNotificationRead {
        lao_id: Hash,
        notification_id: Hash,
    },
    AddTransaction {
        lao_id: Hash,
        roll_call_id: Hash,
        transaction: TransactionRecord,
    },
}

impl StateTransition {
    /// Stable name used in logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddLao { .. } => "add_lao",
            Self::UpdateLao { .. } => "update_lao",
            Self::AddServerAddress { .. } => "add_server_address",
            Self::AddSubscribedChannel { .. } => "add_subscribed_channel",
            Self::AddGreeting { .. } => "add_greeting",
            Self::AddGreetSignature { .. } => "add_greet_signature",
            Self::AddEvent { .. } => "add_event",
            Self::UpdateEvent { .. } => "update_event",
            Self::AddChirp { .. } => "add_chirp",
            Self::DeleteChirp { .. } => "delete_chirp",
            Self::AddReaction { .. } => "add_reaction",
            Self::AddNotification { .. } => "add_notification",
            Self::MarkNotificationRead { .. } => "mark_notification_read",
            Self::AddTransaction { .. } => "add_transaction",
        }
    }
}
