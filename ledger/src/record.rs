//! Ledger-side transaction records.
//!
//! A record keeps only what balance derivation needs: input references and
//! output credits. Script details stay in the wire payload.

use serde::{Deserialize, Serialize};

use agora_messages::data::{PostTransaction, Transaction};
use agora_types::Hash;

/// A reference to the output of a previous transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub source_tx_id: Hash,
    pub output_index: u32,
}

/// A value credited to the holder of a public-key hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub value: u64,
    pub public_key_hash: Hash,
}

/// An immutable ledger entry, keyed by its content-addressed id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: Hash,
    pub inputs: Vec<InputRecord>,
    pub outputs: Vec<OutputRecord>,
}

impl TransactionRecord {
    /// Project a wire payload down to a ledger record.
    pub fn from_message(post: &PostTransaction) -> Self {
        Self {
            transaction_id: post.transaction_id.clone(),
            inputs: post
                .transaction
                .inputs
                .iter()
                .map(|input| InputRecord {
                    source_tx_id: input.tx_out_hash.clone(),
                    output_index: input.tx_out_index,
                })
                .collect(),
            outputs: outputs_of(&post.transaction),
        }
    }

    /// Total value credited to `key_hash` by this transaction.
    pub fn credited_to(&self, key_hash: &Hash) -> u64 {
        self.outputs
            .iter()
            .filter(|o| &o.public_key_hash == key_hash)
            .fold(0u64, |total, o| total.saturating_add(o.value))
    }
}

fn outputs_of(tx: &Transaction) -> Vec<OutputRecord> {
    tx.outputs
        .iter()
        .map(|output| OutputRecord {
            value: output.value,
            public_key_hash: output.script.pubkey_hash.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[(u8, u64)]) -> TransactionRecord {
        TransactionRecord {
            transaction_id: Hash::from_digest([0xEE; 32]),
            inputs: vec![],
            outputs: values
                .iter()
                .map(|(key, value)| OutputRecord {
                    value: *value,
                    public_key_hash: Hash::from_digest([*key; 32]),
                })
                .collect(),
        }
    }

    #[test]
    fn credited_to_sums_matching_outputs() {
        let r = record(&[(1, 10), (2, 7), (1, 5)]);
        assert_eq!(r.credited_to(&Hash::from_digest([1; 32])), 15);
        assert_eq!(r.credited_to(&Hash::from_digest([2; 32])), 7);
    }

    #[test]
    fn credited_to_unknown_key_is_zero() {
        let r = record(&[(1, 10)]);
        assert_eq!(r.credited_to(&Hash::from_digest([9; 32])), 0);
    }
}
