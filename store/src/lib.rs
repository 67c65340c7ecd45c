//! Normalized client state.
//!
//! One [`state::GlobalState`] per process, keyed by organization (LAO) id
//! and mutated exclusively through named [`transition::StateTransition`]
//! records. A commit is all-or-nothing: every record is applied against a
//! working copy and the state only advances when the whole batch holds.
//! Watchers observe the applied records after each commit; they never write.

pub mod records;
pub mod state;
pub mod transition;

pub use records::{
    ChirpRecord, ElectionStatus, EventKind, EventRecord, GreetRecord, LaoRecord,
    NotificationKind, NotificationRecord, ReactionRecord, RollCallStatus,
};
pub use state::{GlobalState, StoreError};
pub use transition::StateTransition;
