//! Timestamp type used throughout the protocol.
//!
//! Timestamps are Unix epoch seconds (UTC) as sent on the wire. Handlers
//! never read the system clock directly; the current time always comes in
//! through the `Clock` collaborator so tests stay deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Whether this timestamp lies more than `leeway_secs` beyond `now`.
    ///
    /// Used to reject payloads stamped in the future; past timestamps are
    /// always accepted (old messages are replayed during catch-up).
    pub fn is_in_future(&self, now: Timestamp, leeway_secs: u64) -> bool {
        self.0 > now.0.saturating_add(leeway_secs)
    }

    /// The string rendering used inside hash preimages.
    pub fn to_digest_string(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
