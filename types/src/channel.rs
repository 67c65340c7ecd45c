//! Channel and server identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::Hash;

/// A named broadcast scope over which messages for one organization (or one
/// of its sub-topics) are exchanged.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// The root channel every client is subscribed to.
    pub fn root() -> Self {
        Self("/root".into())
    }

    /// The main channel of a LAO.
    pub fn for_lao(lao_id: &Hash) -> Self {
        Self(format!("/root/{lao_id}"))
    }

    /// A sub-channel below a LAO channel (e.g. `social`, `coin`).
    pub fn sub(&self, topic: &str) -> Self {
        Self(format!("{}/{topic}", self.0))
    }

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The LAO id this channel is scoped to, if any.
    pub fn lao_id(&self) -> Option<Hash> {
        let mut segments = self.0.split('/');
        let (empty, root, lao) = (segments.next()?, segments.next()?, segments.next()?);
        if !empty.is_empty() || root != "root" {
            return None;
        }
        Hash::new(lao).ok()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({})", self.0)
    }
}

/// The canonical address of a server, e.g. `wss://host:port/path`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerAddress(String);

impl ServerAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServerAddress({})", self.0)
    }
}
