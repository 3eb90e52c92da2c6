//! Core types for the graphschema system
//!
//! This crate provides the foundational pieces shared by every other crate:
//!
//! - **Model**: decoded topology records, schema candidates, and the validated schema
//! - **Identifiers**: the allow-list that guards every label, type and property
//!   name before it is placed into a Cypher query
//! - **Configuration**: connection, validation and output settings
//! - **Error handling**: unified error types
//!

pub mod config;
pub mod error;
pub mod identifier;
pub mod model;

// Re-export main types for convenience
pub use config::{Config, Neo4jConfig, OutputConfig, ValidationConfig};
pub use error::{Error, Result};
pub use identifier::{quote_identifier, validate_identifier, IdentifierKind};
pub use model::{
    NodeRecord, PropertyCandidate, RelationshipRecord, TopologyCandidate, ValidatedSchema,
};
