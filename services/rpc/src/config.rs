//! Service configuration.
//!
//! Loaded from an optional TOML file with `SWITCHYARD_`-prefixed environment
//! variable overrides on top of built-in defaults.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Server configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Instance name, used in logs.
    pub name: String,

    /// Address to bind the listener to.
    pub host: String,
    pub port: u16,

    /// Bound on concurrently served connections; accepts wait for a free
    /// slot once exhausted.
    pub max_connections: usize,

    /// Bound on a single request frame.
    pub max_frame_size: usize,

    /// Namespace assumed for two-segment addresses of non-system actors.
    pub default_namespace: String,

    /// Identity → shared secret table for the bundled verifier.
    pub auth: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            host: "0.0.0.0".to_string(),
            port: 9900,
            max_connections: 256,
            max_frame_size: 16 * 1024 * 1024, // 16MB
            default_namespace: "system".to_string(),
            auth: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional file with environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&ServerConfig::default())
            .context("failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("SWITCHYARD").try_parsing(true));

        let config = builder.build().context("failed to build configuration")?;

        config
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// `host:port` of the listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9900);
        assert_eq!(config.default_namespace, "system");
        assert!(config.auth.is_empty());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = ServerConfig::load(None).unwrap();
        assert_eq!(config.name, "main");
        assert_eq!(config.address(), "0.0.0.0:9900");
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("switchyard.toml");

        let config_content = r#"
name = "edge"
host = "127.0.0.1"
port = 8901
max_connections = 32

[auth]
"kristof.ibiza" = "topsecret"
"#;
        fs::write(&config_path, config_content).unwrap();

        let config = ServerConfig::load(Some(&config_path)).unwrap();
        assert_eq!(config.name, "edge");
        assert_eq!(config.port, 8901);
        assert_eq!(config.max_connections, 32);
        assert_eq!(config.auth.get("kristof.ibiza").unwrap(), "topsecret");
        // untouched fields keep their defaults
        assert_eq!(config.max_frame_size, 16 * 1024 * 1024);
    }
}
