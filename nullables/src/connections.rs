//! Nullable connection pool — records outbound actions without connecting.

use std::sync::Mutex;

use async_trait::async_trait;

use agora_ingest::{ConnectionError, ConnectionPool};
use agora_types::{ChannelId, Hash, ServerAddress};

/// A connection pool double that records every request for assertions.
///
/// Set `fail` to make every call return an error, for exercising the
/// pipeline's tolerance of collaborator failures.
#[derive(Default)]
pub struct NullConnectionPool {
    connects: Mutex<Vec<ServerAddress>>,
    subscriptions: Mutex<Vec<(Hash, ChannelId)>>,
    fail: Mutex<bool>,
}

impl NullConnectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap() = failing;
    }

    /// Peer addresses connection attempts were made to, in order.
    pub fn connected_peers(&self) -> Vec<ServerAddress> {
        self.connects.lock().unwrap().clone()
    }

    /// Channels subscription attempts were made for, in order.
    pub fn subscribed_channels(&self) -> Vec<(Hash, ChannelId)> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConnectionPool for NullConnectionPool {
    async fn connect_to_peer(&self, address: &ServerAddress) -> Result<(), ConnectionError> {
        if *self.fail.lock().unwrap() {
            return Err(ConnectionError::Failed("null pool set to fail".into()));
        }
        self.connects.lock().unwrap().push(address.clone());
        Ok(())
    }

    async fn subscribe(&self, lao_id: &Hash, channel: &ChannelId) -> Result<(), ConnectionError> {
        if *self.fail.lock().unwrap() {
            return Err(ConnectionError::Failed("null pool set to fail".into()));
        }
        self.subscriptions
            .lock()
            .unwrap()
            .push((lao_id.clone(), channel.clone()));
        Ok(())
    }
}
