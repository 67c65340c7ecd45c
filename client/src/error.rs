//! Client startup errors.

use thiserror::Error;

use agora_ingest::RegistryError;

/// Failures while assembling the client. All of these are startup-time:
/// once `build_pipeline` returns, misconfiguration can no longer surface.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
