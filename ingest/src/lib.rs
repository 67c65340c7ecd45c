//! The message ingestion and state-reconciliation pipeline.
//!
//! Frames arrive channel-scoped from the transport, pass through envelope
//! parsing, authenticity verification, route lookup, payload decoding, and
//! handler dispatch, and end as an atomic batch of state transitions (or a
//! locally recovered discard). Watchers re-evaluate reconciliation
//! predicates after every commit and issue outbound protocol actions.
//!
//! Everything here runs on one logical thread of control; the only await
//! points are the collaborator interfaces (connections, signing).

pub mod handlers;
pub mod outcome;
pub mod pipeline;
pub mod registry;
pub mod stats;
pub mod traits;
pub mod watcher;

pub use outcome::{HandlerError, HandlerOutcome, IngestOutcome};
pub use pipeline::{IncomingFrame, Pipeline};
pub use registry::{HandlerContext, Registry, RegistryError};
pub use stats::IngestStats;
pub use traits::{Clock, ConnectionError, ConnectionPool, OutboundAction, SystemClock};
pub use watcher::{GreetWatcher, Watcher};
