//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, Environment, File};
use std::path::Path;
use tracing::debug;

use super::{global_config_path, Config};

/// Legacy environment variables mapped onto `neo4j.*` keys
const NEO4J_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("NEO4J_URI", "neo4j.uri"),
    ("NEO4J_USER", "neo4j.user"),
    ("NEO4J_PASSWORD", "neo4j.password"),
    ("NEO4J_DATABASE", "neo4j.database"),
];

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `GRAPHSCHEMA_` and use double underscores
    /// for nested values. For example:
    /// - `GRAPHSCHEMA_VALIDATION__MAX_CONCURRENT_PROBES=16`
    ///
    /// The plain `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD` and `NEO4J_DATABASE`
    /// variables are honored as well and take precedence.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        // Add the config file if it exists
        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        } else {
            debug!(
                "No configuration file at {}, using defaults",
                path.display()
            );
        }

        // Add environment variables with GRAPHSCHEMA_ prefix
        builder = builder.add_source(
            Environment::with_prefix("GRAPHSCHEMA")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in NEO4J_ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder
                    .set_override(*key, value)
                    .map_err(|e| Error::config(format!("Failed to set {var}: {e}")))?;
            }
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.graphschema/config.toml or custom --config path)
    /// 3. Environment variables (GRAPHSCHEMA_*, then NEO4J_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
