use crate::neo4j::{GraphSession, Neo4jClient};
use graphschema_core::{Error, Neo4jConfig};
use std::sync::Arc;

/// Creates a graph session based on configuration.
///
/// Returns a trait object so the inference pipeline never depends on the
/// concrete driver.
///
/// # Errors
/// Returns [`Error::Connection`] if the database cannot be reached
///
/// # Example
/// ```ignore
/// let config = Config::load(None)?;
/// let session = create_graph_session(&config.neo4j).await?;
/// ```
pub async fn create_graph_session(config: &Neo4jConfig) -> Result<Arc<dyn GraphSession>, Error> {
    let client = Neo4jClient::new(config).await?;
    Ok(Arc::new(client) as Arc<dyn GraphSession>)
}
