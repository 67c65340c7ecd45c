//! Route handlers, one module per feature.
//!
//! Handlers receive a verified envelope and its decoded payload, perform
//! the payload-specific consistency checks (id recomputation, timestamp
//! sanity, parent lookups), and return the transitions to commit. They
//! detect transport redelivery themselves: domain records are keyed by
//! content-addressed ids, so an already applied message is a safe no-op.

pub mod coin;
pub mod election;
pub mod lao;
pub mod meeting;
pub mod roll_call;
pub mod social;
pub mod witness;

use crate::registry::{Registry, RegistryError};

/// How far in the future a payload timestamp may lie before rejection.
/// Past timestamps are always accepted (catch-up replays old messages).
pub(crate) const TIMESTAMP_FUTURE_LEEWAY_SECS: u64 = 300;

/// Register every route this client build understands.
///
/// Registration order across feature modules is irrelevant; routes are
/// independent and the set is fixed before any message is processed.
pub fn configure(registry: &mut Registry) -> Result<(), RegistryError> {
    lao::configure(registry)?;
    meeting::configure(registry)?;
    roll_call::configure(registry)?;
    election::configure(registry)?;
    witness::configure(registry)?;
    social::configure(registry)?;
    coin::configure(registry)?;
    Ok(())
}
