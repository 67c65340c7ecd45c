//! Startup wiring for the agora client core.
//!
//! Brings the pieces together the way the application boots them: build the
//! route registry (all feature handlers, registered once), choose the
//! ledger policy from configuration, and assemble the pipeline with live
//! collaborators. Everything here is startup-time; a misconfigured route
//! set fails here, never during message processing.

pub mod config;
pub mod error;

use std::sync::Arc;

use agora_ingest::{handlers, Clock, ConnectionPool, Pipeline, Registry};
use agora_ledger::SelfConsistent;
use agora_types::PublicKey;
use agora_utils::LogFormat;

pub use config::ClientConfig;
pub use error::ClientError;

/// Build the routing table with every supported route registered.
pub fn build_registry() -> Result<Registry, ClientError> {
    let mut registry = Registry::new();
    handlers::configure(&mut registry)?;
    Ok(registry)
}

/// Assemble a pipeline from configuration and collaborators.
pub fn build_pipeline(
    config: &ClientConfig,
    connections: Arc<dyn ConnectionPool>,
    clock: Arc<dyn Clock>,
    own_key: Option<PublicKey>,
) -> Result<Pipeline, ClientError> {
    let registry = build_registry()?;
    let mut pipeline = Pipeline::new(registry, connections, clock);
    if config.strict_transactions {
        pipeline.set_policy(Box::new(SelfConsistent));
    }
    if let Some(key) = own_key {
        pipeline.set_own_key(key);
    }
    tracing::info!(
        strict_transactions = config.strict_transactions,
        "pipeline assembled"
    );
    Ok(pipeline)
}

/// Initialise logging from the configuration.
///
/// Unknown format strings fall back to human-readable output.
pub fn init_logging(config: &ClientConfig) {
    let format = match config.log_format.as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Human,
    };
    agora_utils::init_tracing(format, &config.log_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_builds_once() {
        let registry = build_registry().unwrap();
        assert!(!registry.is_empty());
    }
}
