//! Shared utilities for the agora client.

pub mod logging;

pub use logging::{init_tracing, LogFormat};
