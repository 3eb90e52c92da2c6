#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Query execution layer for graphschema
//!
//! Exposes the read-only [`GraphSession`] capability the inference pipeline
//! runs against, a `neo4rs`-backed implementation, and a scripted mock for
//! tests.

pub mod error;
mod factory;
mod neo4j;
pub mod query;

pub use error::QueryError;
pub use factory::create_graph_session;
pub use neo4j::{GraphSession, MockGraphSession, Neo4jClient};
pub use query::{
    ColumnKind, ColumnSpec, RawGraph, RawNode, RawRelationship, ReadQuery, Row, Value,
};
