//! Witness cosignature payload.
//!
//! A witness broadcasts this after observing a message; the carried
//! signature is over the witnessed message's id. This is how cosignatures
//! "arrive on separate messages" and accumulate on already stored records
//! such as a server greeting.

use serde::{Deserialize, Serialize};

use agora_types::{Hash, Signature};

use crate::data::{ActionType, ObjectType, Payload};

/// A witness's signature over a previously broadcast message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessMessage {
    pub object: ObjectType,
    pub action: ActionType,
    pub message_id: Hash,
    /// Signature by the witness over `message_id`.
    pub signature: Signature,
}

impl Payload for WitnessMessage {
    const OBJECT: ObjectType = ObjectType::Message;
    const ACTION: ActionType = ActionType::Witness;
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_crypto::{keypair_from_seed, sign};

    #[test]
    fn wire_shape() {
        let kp = keypair_from_seed(&[8u8; 32]);
        let target = Hash::from_digest([5; 32]);
        let msg = WitnessMessage {
            object: ObjectType::Message,
            action: ActionType::Witness,
            message_id: target.clone(),
            signature: sign(target.as_str().as_bytes(), &kp.private),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.starts_with("{\"object\":\"message\",\"action\":\"witness\","));
        let back: WitnessMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
