//! Trait definition for read-only graph sessions

use async_trait::async_trait;

use crate::error::QueryError;
use crate::query::{RawGraph, ReadQuery, Row};

/// Read-only access to a graph database
///
/// Implementations must be safe to share across concurrently running probes.
#[async_trait]
pub trait GraphSession: Send + Sync {
    /// Execute a query and decode every row against its declared columns
    async fn fetch_rows(&self, query: &ReadQuery) -> Result<Vec<Row>, QueryError>;

    /// Execute a query returning `nodes` and `relationships` list columns
    /// (the shape of `db.schema.visualization()`) and collect them
    async fn fetch_graph(&self, cypher: &str) -> Result<RawGraph, QueryError>;

    /// Round-trip a trivial query to verify the connection
    async fn ping(&self) -> Result<(), QueryError>;
}
