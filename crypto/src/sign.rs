//! Ed25519 message signing and verification.

use agora_types::{PrivateKey, PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Sign a message with a private key, returning the signature.
pub fn sign(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature::from_bytes(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise. Undecodable
/// key or signature text counts as invalid; this function never panics and
/// never errors, so callers can treat `false` as plain rejection.
pub fn verify(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(key_bytes) = public_key.to_bytes() else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = signature.to_bytes() else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);
    verifying_key.verify(message, &dalek_sig).is_ok()
}
