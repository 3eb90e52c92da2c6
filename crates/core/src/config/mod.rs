//! Configuration module for the graphschema system
//!
//! This module provides configuration structures and loading mechanisms.
//! Configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.graphschema/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".graphschema").join("config.toml"))
}

/// Main configuration structure for the graphschema system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Neo4j connection configuration
    #[serde(default)]
    pub neo4j: Neo4jConfig,

    /// Candidate validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Schema document output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration for the Neo4j connection
#[derive(Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687` or `neo4j://host:7687`
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,

    /// Neo4j username
    #[serde(default = "default_neo4j_user")]
    pub user: String,

    /// Neo4j password
    #[serde(default = "default_neo4j_password")]
    pub password: String,

    /// Database to introspect (server default when unset)
    #[serde(default)]
    pub database: Option<String>,

    /// Maximum pooled connections shared by all probes
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Rows fetched per round-trip when streaming results
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            database: None,
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl std::fmt::Debug for Neo4jConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***REDACTED***")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

/// Configuration for existence probing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum probe queries in flight at once
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,

    /// Timeout for a single probe attempt in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Extra attempts for probes failing with a transient error
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    /// Delay before the first retry in milliseconds, doubled per attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Upper bound for the retry delay in milliseconds
    #[serde(default = "default_max_retry_backoff_ms")]
    pub max_retry_backoff_ms: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_probes: default_max_concurrent_probes(),
            probe_timeout_secs: default_probe_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_retry_backoff_ms: default_max_retry_backoff_ms(),
        }
    }
}

impl ValidationConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based): base, 2x base, 4x base, ... capped
    pub fn retry_backoff(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as u32;
        let delay = self
            .retry_backoff_ms
            .saturating_mul(2u64.saturating_pow(exponent))
            .min(self.max_retry_backoff_ms);
        Duration::from_millis(delay)
    }
}

/// Configuration for the exported schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination of the schema document
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Pretty-print the JSON document
    #[serde(default)]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            pretty: false,
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate connection configuration
        let valid_schemes = [
            "bolt://",
            "bolt+s://",
            "bolt+ssc://",
            "neo4j://",
            "neo4j+s://",
            "neo4j+ssc://",
        ];
        if !valid_schemes
            .iter()
            .any(|scheme| self.neo4j.uri.starts_with(scheme))
        {
            return Err(Error::config(format!(
                "Invalid neo4j.uri '{}'. Must start with one of: {valid_schemes:?}",
                self.neo4j.uri
            )));
        }
        if self.neo4j.user.is_empty() {
            return Err(Error::config("neo4j.user cannot be empty".to_string()));
        }
        if let Some(database) = &self.neo4j.database {
            if database.is_empty()
                || !database
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
            {
                return Err(Error::config(format!(
                    "Invalid neo4j.database '{database}': only ASCII alphanumeric, '.', '-' and '_' allowed"
                )));
            }
        }
        if self.neo4j.max_connections == 0 {
            return Err(Error::config(
                "neo4j.max_connections must be greater than 0".to_string(),
            ));
        }
        if self.neo4j.fetch_size == 0 {
            return Err(Error::config(
                "neo4j.fetch_size must be greater than 0".to_string(),
            ));
        }

        // Validate probing configuration
        if self.validation.max_concurrent_probes == 0 {
            return Err(Error::config(
                "validation.max_concurrent_probes must be greater than 0".to_string(),
            ));
        }
        if self.validation.max_concurrent_probes > 256 {
            return Err(Error::config(format!(
                "validation.max_concurrent_probes too large (max 256, got {})",
                self.validation.max_concurrent_probes
            )));
        }
        if self.validation.probe_timeout_secs == 0 {
            return Err(Error::config(
                "validation.probe_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.validation.retry_attempts > 10 {
            return Err(Error::config(format!(
                "validation.retry_attempts too large (max 10, got {})",
                self.validation.retry_attempts
            )));
        }
        if self.validation.max_retry_backoff_ms < self.validation.retry_backoff_ms {
            return Err(Error::config(format!(
                "validation.max_retry_backoff_ms ({}) cannot be below retry_backoff_ms ({})",
                self.validation.max_retry_backoff_ms, self.validation.retry_backoff_ms
            )));
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(Error::config("output.path cannot be empty".to_string()));
        }

        Ok(())
    }
}
