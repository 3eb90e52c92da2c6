//! Default values and functions for configuration

use std::path::PathBuf;

// Default constants
pub(crate) const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";
pub(crate) const DEFAULT_NEO4J_USER: &str = "neo4j";
pub(crate) const DEFAULT_NEO4J_PASSWORD: &str = "password";
pub(crate) const DEFAULT_OUTPUT_PATH: &str = "neo4j-schema.json";

pub(crate) fn default_neo4j_uri() -> String {
    DEFAULT_NEO4J_URI.to_string()
}

pub(crate) fn default_neo4j_user() -> String {
    DEFAULT_NEO4J_USER.to_string()
}

pub(crate) fn default_neo4j_password() -> String {
    DEFAULT_NEO4J_PASSWORD.to_string()
}

pub(crate) fn default_max_connections() -> usize {
    16
}

pub(crate) fn default_fetch_size() -> usize {
    500
}

pub(crate) fn default_max_concurrent_probes() -> usize {
    8
}

pub(crate) fn default_probe_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_retry_attempts() -> usize {
    3
}

pub(crate) fn default_retry_backoff_ms() -> u64 {
    500
}

pub(crate) fn default_max_retry_backoff_ms() -> u64 {
    10_000
}

pub(crate) fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}
