//! Nullable infrastructure for deterministic testing.
//!
//! The pipeline's external dependencies (clock, connection manager,
//! signing backend) are abstracted behind traits. This crate provides
//! test-friendly implementations that return deterministic values, can be
//! controlled programmatically, and never touch the network.
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod connections;
pub mod signer;

pub use clock::NullClock;
pub use connections::NullConnectionPool;
pub use signer::NullSigner;
