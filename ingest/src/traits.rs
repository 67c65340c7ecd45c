//! Collaborator interfaces consumed by the pipeline and watchers.
//!
//! These are the seams to the world outside the ingestion core: wall-clock
//! time and the connection manager. Test doubles live in `agora-nullables`.

use async_trait::async_trait;
use thiserror::Error;

use agora_types::{ChannelId, Hash, ServerAddress, Timestamp};

/// Source of the current time. Handlers never read the system clock
/// directly, which keeps staleness checks deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The live clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Timestamp::new(secs)
    }
}

/// Failures of the connection collaborator. Logged and dropped; an outbound
/// failure never affects the outcome of the message that triggered it.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection failed: {0}")]
    Failed(String),

    #[error("connection attempt timed out")]
    Timeout,
}

/// An outbound protocol action issued by a watcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundAction {
    ConnectToPeer(ServerAddress),
    Subscribe { lao_id: Hash, channel: ChannelId },
}

/// Connection-management collaborator: opens peer connections and channel
/// subscriptions on behalf of watchers.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    async fn connect_to_peer(&self, address: &ServerAddress) -> Result<(), ConnectionError>;

    async fn subscribe(&self, lao_id: &Hash, channel: &ChannelId) -> Result<(), ConnectionError>;
}
