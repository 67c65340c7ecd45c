//! Transaction acceptance policy.
//!
//! The protocol currently trusts posted transactions: referenced inputs are
//! not checked for prior spending and output totals are not compared to
//! input totals. That relaxation is isolated behind [`TransactionPolicy`]
//! so a stricter variant can be substituted without touching the reducer.

use thiserror::Error;

use agora_messages::data::PostTransaction;
use agora_types::Hash;

/// A policy rejection. Rejections discard the message; they are not
/// invariant violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("transaction id {claimed} does not match recomputed {expected}")]
    IdMismatch { claimed: Hash, expected: Hash },
}

/// Decides whether a posted transaction may enter the ledger.
pub trait TransactionPolicy: Send + Sync {
    fn check(&self, post: &PostTransaction) -> Result<(), PolicyViolation>;
}

/// Accepts every structurally valid transaction without verifying hashes.
pub struct Trusting;

impl TransactionPolicy for Trusting {
    fn check(&self, _post: &PostTransaction) -> Result<(), PolicyViolation> {
        Ok(())
    }
}

/// Recomputes the transaction id and rejects mismatches.
pub struct SelfConsistent;

impl TransactionPolicy for SelfConsistent {
    fn check(&self, post: &PostTransaction) -> Result<(), PolicyViolation> {
        let expected = PostTransaction::expected_transaction_id(&post.transaction);
        if expected != post.transaction_id {
            return Err(PolicyViolation::IdMismatch {
                claimed: post.transaction_id.clone(),
                expected,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_crypto::{hash_parts, keypair_from_seed, sign};
    use agora_messages::data::{
        ActionType, InputScript, ObjectType, OutputScript, Transaction, TxInput, TxOutput,
    };

    fn sample_post(correct_id: bool) -> PostTransaction {
        let kp = keypair_from_seed(&[31u8; 32]);
        let transaction = Transaction {
            version: 1,
            inputs: vec![TxInput {
                tx_out_hash: Hash::from_digest([0xAB; 32]),
                tx_out_index: 0,
                script: InputScript {
                    script_type: "P2PKH".into(),
                    pubkey: kp.public.clone(),
                    sig: sign(b"tx", &kp.private),
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
        };
        let transaction_id = if correct_id {
            PostTransaction::expected_transaction_id(&transaction)
        } else {
            Hash::from_digest([0; 32])
        };
        PostTransaction {
            object: ObjectType::Coin,
            action: ActionType::PostTransaction,
            transaction_id,
            transaction,
        }
    }

    #[test]
    fn trusting_accepts_anything() {
        assert!(Trusting.check(&sample_post(false)).is_ok());
    }

    #[test]
    fn self_consistent_accepts_correct_id() {
        assert!(SelfConsistent.check(&sample_post(true)).is_ok());
    }

    #[test]
    fn self_consistent_rejects_wrong_id() {
        let err = SelfConsistent.check(&sample_post(false)).unwrap_err();
        assert!(matches!(err, PolicyViolation::IdMismatch { .. }));
    }
}
