//! Digital-cash transaction payload.
//!
//! The transaction id is self-verifying: the content address of the inputs
//! and outputs in wire order. Whether a mismatching id is rejected is a
//! ledger policy decision (`agora_ledger::TransactionPolicy`), not a codec
//! concern, so `expected_transaction_id` is exposed here and enforcement
//! happens behind that seam.

use serde::{Deserialize, Serialize};

use agora_crypto::hash_parts;
use agora_types::{Hash, ProtocolError, PublicKey, Signature};

use crate::data::{ActionType, ObjectType, Payload};

/// Unlocking script of a transaction input (pay-to-public-key-hash).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputScript {
    #[serde(rename = "type")]
    pub script_type: String,
    pub pubkey: PublicKey,
    pub sig: Signature,
}

/// A reference to a previous transaction output being consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub tx_out_hash: Hash,
    pub tx_out_index: u32,
    pub script: InputScript,
}

/// Locking script of a transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputScript {
    #[serde(rename = "type")]
    pub script_type: String,
    pub pubkey_hash: Hash,
}

/// A value credited to the holder of a public-key hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: u64,
    pub script: OutputScript,
}

/// The transaction body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

/// Data sent to post a transaction on a LAO's coin channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTransaction {
    pub object: ObjectType,
    pub action: ActionType,
    pub transaction_id: Hash,
    pub transaction: Transaction,
}

impl PostTransaction {
    /// Recompute the content address of a transaction body.
    ///
    /// The preimage is every input's fields followed by every output's
    /// fields, in wire order.
    pub fn expected_transaction_id(transaction: &Transaction) -> Hash {
        let mut parts: Vec<String> = Vec::new();
        for input in &transaction.inputs {
            parts.push(input.tx_out_hash.as_str().to_owned());
            parts.push(input.tx_out_index.to_string());
            parts.push(input.script.script_type.clone());
            parts.push(input.script.pubkey.as_str().to_owned());
            parts.push(input.script.sig.as_str().to_owned());
        }
        for output in &transaction.outputs {
            parts.push(output.value.to_string());
            parts.push(output.script.script_type.clone());
            parts.push(output.script.pubkey_hash.as_str().to_owned());
        }
        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        hash_parts(&refs)
    }
}

impl Payload for PostTransaction {
    const OBJECT: ObjectType = ObjectType::Coin;
    const ACTION: ActionType = ActionType::PostTransaction;

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.transaction.outputs.is_empty() {
            return Err(ProtocolError::InvalidField {
                field: "outputs",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_crypto::{keypair_from_seed, sign};

    fn sample_transaction() -> Transaction {
        let kp = keypair_from_seed(&[11u8; 32]);
        Transaction {
            version: 1,
            inputs: vec![TxInput {
                tx_out_hash: Hash::from_digest([0xAB; 32]),
                tx_out_index: 0,
                script: InputScript {
                    script_type: "P2PKH".into(),
                    pubkey: kp.public.clone(),
                    sig: sign(b"tx data", &kp.private),
                },
            }],
            outputs: vec![TxOutput {
                value: 32,
                script: OutputScript {
                    script_type: "P2PKH".into(),
                    pubkey_hash: hash_parts(&[kp.public.as_str()]),
                },
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn transaction_id_is_deterministic() {
        let tx = sample_transaction();
        assert_eq!(
            PostTransaction::expected_transaction_id(&tx),
            PostTransaction::expected_transaction_id(&tx)
        );
    }

    #[test]
    fn transaction_id_changes_with_output_value() {
        let tx = sample_transaction();
        let mut other = tx.clone();
        other.outputs[0].value = 33;
        assert_ne!(
            PostTransaction::expected_transaction_id(&tx),
            PostTransaction::expected_transaction_id(&other)
        );
    }

    #[test]
    fn script_type_uses_wire_key() {
        let tx = sample_transaction();
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"type\":\"P2PKH\""));
        assert!(json.contains("\"tx_out_hash\""));
        assert!(json.contains("\"lock_time\":0"));
    }

    #[test]
    fn post_transaction_without_outputs_rejected() {
        let mut tx = sample_transaction();
        tx.outputs.clear();
        let post = PostTransaction {
            object: ObjectType::Coin,
            action: ActionType::PostTransaction,
            transaction_id: PostTransaction::expected_transaction_id(&tx),
            transaction: tx,
        };
        assert!(post.validate().is_err());
    }
}
