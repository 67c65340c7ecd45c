//! The signed, content-addressed message envelope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use agora_crypto::{hash_parts, sign, verify, Signer, SignerError};
use agora_types::{Base64UrlData, Hash, KeyPair, ProtocolError, PublicKey, Signature};

use crate::codec::{decode_data_json, encode_message_data};
use crate::data::MessageData;

/// Authenticity failures of an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("message_id does not match the hash of the payload")]
    IdentityMismatch,

    #[error("signature does not verify against the sender key")]
    SignatureInvalid,
}

/// Failures while constructing an outbound envelope.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("payload encoding failed: {0}")]
    Encode(#[from] ProtocolError),

    #[error("signing failed: {0}")]
    Signing(#[from] SignerError),
}

/// A cosignature attached to an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessSignature {
    pub witness: PublicKey,
    pub signature: Signature,
}

/// A signed broadcast message.
///
/// Immutable once constructed: the pipeline hands out shared references
/// after dispatch and never mutates an envelope. Witness signatures that
/// arrive later live in the store's records, not here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub sender: PublicKey,
    pub signature: Signature,
    pub message_id: Hash,
    /// base64url(canonical JSON of the payload).
    pub data: Base64UrlData,
    pub witness_signatures: Vec<WitnessSignature>,
}

impl Message {
    /// Parse an envelope from a raw frame.
    pub fn parse(frame: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(frame).map_err(|e| ProtocolError::MalformedJson(e.to_string()))
    }

    /// Build and sign an envelope with an in-memory key pair.
    pub fn from_data(data: &MessageData, keypair: &KeyPair) -> Result<Self, ProtocolError> {
        let encoded = encode_message_data(data)?;
        let message_id = hash_parts(&[encoded.as_str()]);
        let signature = sign(encoded.as_bytes(), &keypair.private);
        Ok(Self {
            sender: keypair.public.clone(),
            signature,
            message_id,
            data: encoded,
            witness_signatures: Vec::new(),
        })
    }

    /// Build an envelope, awaiting an external signing backend.
    ///
    /// Encoding and content addressing happen synchronously; only the
    /// signature suspends.
    pub async fn from_data_with_signer(
        data: &MessageData,
        signer: &dyn Signer,
    ) -> Result<Self, BuildError> {
        let encoded = encode_message_data(data)?;
        let message_id = hash_parts(&[encoded.as_str()]);
        let signature = signer.sign(encoded.as_bytes()).await?;
        Ok(Self {
            sender: signer.public_key(),
            signature,
            message_id,
            data: encoded,
            witness_signatures: Vec::new(),
        })
    }

    /// Check content address and signature.
    pub fn verify(&self) -> Result<(), AuthError> {
        if hash_parts(&[self.data.as_str()]) != self.message_id {
            return Err(AuthError::IdentityMismatch);
        }
        if !verify(self.data.as_bytes(), &self.signature, &self.sender) {
            return Err(AuthError::SignatureInvalid);
        }
        Ok(())
    }

    /// Decode the payload into a JSON value for routing and dispatch.
    pub fn data_json(&self) -> Result<serde_json::Value, ProtocolError> {
        decode_data_json(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AddChirp, MessageData};
    use agora_crypto::{keypair_from_seed, LocalSigner};
    use agora_types::Timestamp;

    fn chirp_data() -> MessageData {
        MessageData::ChirpAdd(AddChirp::new("text", None, Timestamp::new(1_607_277_600)))
    }

    #[test]
    fn from_data_verifies() {
        let kp = keypair_from_seed(&[21u8; 32]);
        let msg = Message::from_data(&chirp_data(), &kp).unwrap();
        assert_eq!(msg.sender, kp.public);
        assert!(msg.verify().is_ok());
    }

    #[test]
    fn from_data_signature_matches_direct_signing() {
        let kp = keypair_from_seed(&[21u8; 32]);
        let msg = Message::from_data(&chirp_data(), &kp).unwrap();
        let encoded = encode_message_data(&chirp_data()).unwrap();
        assert_eq!(msg.signature, sign(encoded.as_bytes(), &kp.private));
    }

    #[tokio::test]
    async fn signer_built_envelope_verifies() {
        let signer = LocalSigner::new(keypair_from_seed(&[22u8; 32]));
        let msg = Message::from_data_with_signer(&chirp_data(), &signer)
            .await
            .unwrap();
        assert!(msg.verify().is_ok());
    }

    #[test]
    fn tampered_payload_fails_with_identity_mismatch() {
        let kp = keypair_from_seed(&[23u8; 32]);
        let mut msg = Message::from_data(&chirp_data(), &kp).unwrap();
        msg.data = Base64UrlData::encode(b"{\"tampered\":true}");
        assert_eq!(msg.verify(), Err(AuthError::IdentityMismatch));
    }

    #[test]
    fn tampered_message_id_fails_with_identity_mismatch() {
        let kp = keypair_from_seed(&[23u8; 32]);
        let mut msg = Message::from_data(&chirp_data(), &kp).unwrap();
        msg.message_id = Hash::from_digest([0; 32]);
        assert_eq!(msg.verify(), Err(AuthError::IdentityMismatch));
    }

    #[test]
    fn tampered_payload_with_recomputed_id_fails_with_signature_invalid() {
        let kp = keypair_from_seed(&[27u8; 32]);
        let mut msg = Message::from_data(&chirp_data(), &kp).unwrap();
        // the attacker fixes up the content address but cannot re-sign
        msg.data = Base64UrlData::encode(b"{\"object\":\"chirp\",\"action\":\"add\"}");
        msg.message_id = hash_parts(&[msg.data.as_str()]);
        assert_eq!(msg.verify(), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn foreign_signature_fails_with_signature_invalid() {
        let kp = keypair_from_seed(&[24u8; 32]);
        let other = keypair_from_seed(&[25u8; 32]);
        let mut msg = Message::from_data(&chirp_data(), &kp).unwrap();
        // swap in a signature from a different key over the same payload
        msg.signature = sign(msg.data.as_bytes(), &other.private);
        assert_eq!(msg.verify(), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn parse_rejects_malformed_frames() {
        assert!(Message::parse(b"{\"sender\": 42}").is_err());
        assert!(Message::parse(b"not json at all").is_err());
    }

    #[test]
    fn parse_roundtrip() {
        let kp = keypair_from_seed(&[26u8; 32]);
        let msg = Message::from_data(&chirp_data(), &kp).unwrap();
        let frame = serde_json::to_vec(&msg).unwrap();
        let parsed = Message::parse(&frame).unwrap();
        assert_eq!(parsed.message_id, msg.message_id);
        assert!(parsed.verify().is_ok());
    }
}
