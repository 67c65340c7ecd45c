//! Asynchronous signing seam.
//!
//! Outbound messages may be signed by a key the process does not hold in
//! memory (hardware token, wallet service). The [`Signer`] trait is the
//! suspension point: callers validate and encode synchronously, await the
//! signature, then resume. Timeouts belong to the caller and surface as
//! [`SignerError::Unavailable`].

use agora_types::{KeyPair, PublicKey, Signature};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a signing backend.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing backend unavailable: {0}")]
    Unavailable(String),

    #[error("signing request timed out")]
    Timeout,
}

/// A source of signatures for outbound protocol messages.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The public key signatures will verify against.
    fn public_key(&self) -> PublicKey;

    /// Sign `data`, possibly suspending while an external backend responds.
    async fn sign(&self, data: &[u8]) -> Result<Signature, SignerError>;
}

/// A signer backed by an in-memory key pair. Never suspends.
pub struct LocalSigner {
    keypair: KeyPair,
}

impl LocalSigner {
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl Signer for LocalSigner {
    fn public_key(&self) -> PublicKey {
        self.keypair.public.clone()
    }

    async fn sign(&self, data: &[u8]) -> Result<Signature, SignerError> {
        Ok(crate::sign(data, &self.keypair.private))
    }
}
