//! Normalized cash state: transactions, credit index, running balances.
//!
//! Scoped per (LAO, roll call): attendance defines who can hold coins, so
//! each closed roll call opens a fresh scope. Within a scope the ledger is
//! additive — recording a transaction updates the reverse index from each
//! credited key hash to the crediting transaction ids and the running
//! balance per key.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use agora_types::Hash;

use crate::record::TransactionRecord;

/// Invariant failures while recording a transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Two different transaction bodies claimed the same id. Content
    /// addressing makes this unreachable for honest input; treat as a bug.
    #[error("conflicting transaction bodies for id {0}")]
    Conflict(Hash),
}

/// One roll-call scope of the ledger.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScopeLedger {
    /// Transaction ids in arrival order.
    transaction_ids: Vec<Hash>,
    by_id: HashMap<Hash, TransactionRecord>,
    /// Reverse index: credited key hash -> crediting transaction ids.
    by_public_key_hash: HashMap<Hash, Vec<Hash>>,
    /// Running balance per credited key hash.
    balances: HashMap<Hash, u64>,
}

impl ScopeLedger {
    fn record(&mut self, tx: TransactionRecord) -> Result<bool, LedgerError> {
        if let Some(existing) = self.by_id.get(&tx.transaction_id) {
            if existing != &tx {
                return Err(LedgerError::Conflict(tx.transaction_id));
            }
            // redelivery of an already applied transaction
            return Ok(false);
        }

        for output in &tx.outputs {
            self.by_public_key_hash
                .entry(output.public_key_hash.clone())
                .or_default()
                .push(tx.transaction_id.clone());
            let balance = self.balances.entry(output.public_key_hash.clone()).or_insert(0);
            *balance = balance.saturating_add(output.value);
        }
        self.transaction_ids.push(tx.transaction_id.clone());
        self.by_id.insert(tx.transaction_id.clone(), tx);
        Ok(true)
    }

    fn balance(&self, key_hash: &Hash) -> u64 {
        self.balances.get(key_hash).copied().unwrap_or(0)
    }
}

/// All digital-cash state, keyed by LAO then roll call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CashState {
    by_lao: HashMap<Hash, HashMap<Hash, ScopeLedger>>,
}

impl CashState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction in its scope.
    ///
    /// Returns `Ok(true)` if the transaction was new, `Ok(false)` on
    /// redelivery (safe no-op).
    pub fn record(
        &mut self,
        lao_id: &Hash,
        roll_call_id: &Hash,
        tx: TransactionRecord,
    ) -> Result<bool, LedgerError> {
        self.by_lao
            .entry(lao_id.clone())
            .or_default()
            .entry(roll_call_id.clone())
            .or_default()
            .record(tx)
    }

    /// Balance of a key hash within one scope; unknown keys hold zero.
    pub fn balance(&self, lao_id: &Hash, roll_call_id: &Hash, key_hash: &Hash) -> u64 {
        self.scope(lao_id, roll_call_id)
            .map(|s| s.balance(key_hash))
            .unwrap_or(0)
    }

    /// Ids of the transactions crediting a key hash, in arrival order.
    pub fn credits(&self, lao_id: &Hash, roll_call_id: &Hash, key_hash: &Hash) -> &[Hash] {
        self.scope(lao_id, roll_call_id)
            .and_then(|s| s.by_public_key_hash.get(key_hash))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a stored transaction.
    pub fn transaction(
        &self,
        lao_id: &Hash,
        roll_call_id: &Hash,
        tx_id: &Hash,
    ) -> Option<&TransactionRecord> {
        self.scope(lao_id, roll_call_id).and_then(|s| s.by_id.get(tx_id))
    }

    /// All transactions of a scope in arrival order.
    pub fn transactions(&self, lao_id: &Hash, roll_call_id: &Hash) -> Vec<&TransactionRecord> {
        match self.scope(lao_id, roll_call_id) {
            Some(s) => s
                .transaction_ids
                .iter()
                .filter_map(|id| s.by_id.get(id))
                .collect(),
            None => Vec::new(),
        }
    }

    fn scope(&self, lao_id: &Hash, roll_call_id: &Hash) -> Option<&ScopeLedger> {
        self.by_lao.get(lao_id).and_then(|rc| rc.get(roll_call_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::OutputRecord;

    fn lao() -> Hash {
        Hash::from_digest([0x10; 32])
    }

    fn roll_call() -> Hash {
        Hash::from_digest([0x20; 32])
    }

    fn key(k: u8) -> Hash {
        Hash::from_digest([k; 32])
    }

    fn tx(id: u8, outputs: &[(u8, u64)]) -> TransactionRecord {
        TransactionRecord {
            transaction_id: Hash::from_digest([id; 32]),
            inputs: vec![],
            outputs: outputs
                .iter()
                .map(|(k, v)| OutputRecord {
                    value: *v,
                    public_key_hash: key(*k),
                })
                .collect(),
        }
    }

    #[test]
    fn balances_accumulate_across_transactions() {
        let mut cash = CashState::new();
        cash.record(&lao(), &roll_call(), tx(1, &[(7, 10)])).unwrap();
        cash.record(&lao(), &roll_call(), tx(2, &[(7, 5)])).unwrap();
        assert_eq!(cash.balance(&lao(), &roll_call(), &key(7)), 15);
    }

    #[test]
    fn unknown_key_balance_is_zero() {
        let cash = CashState::new();
        assert_eq!(cash.balance(&lao(), &roll_call(), &key(1)), 0);
    }

    #[test]
    fn redelivery_is_a_noop() {
        let mut cash = CashState::new();
        assert!(cash.record(&lao(), &roll_call(), tx(1, &[(7, 10)])).unwrap());
        assert!(!cash.record(&lao(), &roll_call(), tx(1, &[(7, 10)])).unwrap());
        assert_eq!(cash.balance(&lao(), &roll_call(), &key(7)), 10);
    }

    #[test]
    fn conflicting_body_for_same_id_is_loud() {
        let mut cash = CashState::new();
        cash.record(&lao(), &roll_call(), tx(1, &[(7, 10)])).unwrap();
        let err = cash
            .record(&lao(), &roll_call(), tx(1, &[(7, 11)]))
            .unwrap_err();
        assert_eq!(err, LedgerError::Conflict(Hash::from_digest([1; 32])));
    }

    #[test]
    fn scopes_are_isolated() {
        let mut cash = CashState::new();
        let other_rc = Hash::from_digest([0x21; 32]);
        cash.record(&lao(), &roll_call(), tx(1, &[(7, 10)])).unwrap();
        assert_eq!(cash.balance(&lao(), &other_rc, &key(7)), 0);
    }

    #[test]
    fn credit_index_tracks_arrival_order() {
        let mut cash = CashState::new();
        cash.record(&lao(), &roll_call(), tx(1, &[(7, 1)])).unwrap();
        cash.record(&lao(), &roll_call(), tx(2, &[(7, 2)])).unwrap();
        let credits = cash.credits(&lao(), &roll_call(), &key(7));
        assert_eq!(credits, &[Hash::from_digest([1; 32]), Hash::from_digest([2; 32])]);
    }

    #[test]
    fn split_output_credits_both_keys() {
        let mut cash = CashState::new();
        cash.record(&lao(), &roll_call(), tx(1, &[(7, 10), (8, 22)]))
            .unwrap();
        assert_eq!(cash.balance(&lao(), &roll_call(), &key(7)), 10);
        assert_eq!(cash.balance(&lao(), &roll_call(), &key(8)), 22);
    }
}
