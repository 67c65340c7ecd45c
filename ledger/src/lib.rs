//! UTXO-style digital-cash ledger.
//!
//! An additive balance model: transactions are stored by their self-verifying
//! id and every output credits a public-key hash. Balances are sums of
//! credits within one roll-call scope; no spend tracking is performed. How
//! much of the transaction is verified before recording is a
//! [`TransactionPolicy`] decision.

pub mod cash;
pub mod policy;
pub mod record;

pub use cash::{CashState, LedgerError};
pub use policy::{PolicyViolation, SelfConsistent, TransactionPolicy, Trusting};
pub use record::{InputRecord, OutputRecord, TransactionRecord};
