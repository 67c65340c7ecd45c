//! Nullable signer — deterministic signatures, controllable failure.

use std::sync::Mutex;

use async_trait::async_trait;

use agora_crypto::{keypair_from_seed, sign, Signer, SignerError};
use agora_types::{KeyPair, PublicKey, Signature};

/// A signing backend double with a seed-derived key.
///
/// Signatures are real (and verify against [`NullSigner::public_key`]),
/// but produced without any suspension. `set_failing` simulates an
/// unavailable hardware token.
pub struct NullSigner {
    keypair: KeyPair,
    fail: Mutex<bool>,
}

impl NullSigner {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            keypair: keypair_from_seed(seed),
            fail: Mutex::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap() = failing;
    }
}

#[async_trait]
impl Signer for NullSigner {
    fn public_key(&self) -> PublicKey {
        self.keypair.public.clone()
    }

    async fn sign(&self, data: &[u8]) -> Result<Signature, SignerError> {
        if *self.fail.lock().unwrap() {
            return Err(SignerError::Unavailable("null signer set to fail".into()));
        }
        Ok(sign(data, &self.keypair.private))
    }
}
