//! Client configuration with TOML file support.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Configuration for the agora client core.
///
/// Can be loaded from a TOML file via [`ClientConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server addresses to contact on startup.
    #[serde(default)]
    pub servers: Vec<String>,

    /// Verify transaction ids before accepting coin messages, instead of
    /// the protocol's default trusting behavior.
    #[serde(default)]
    pub strict_transactions: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ClientError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ClientError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            strict_transactions: false,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("").expect("empty toml should use defaults");
        assert!(config.servers.is_empty());
        assert!(!config.strict_transactions);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            servers = ["wss://server:9000/main"]
            strict_transactions = true
        "#;
        let config = ClientConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.servers, vec!["wss://server:9000/main"]);
        assert!(config.strict_transactions);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agora.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();
        let config = ClientConfig::from_toml_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ClientConfig::from_toml_file("/nonexistent/agora.toml");
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(ClientConfig::from_toml_str("servers = 3").is_err());
    }
}
