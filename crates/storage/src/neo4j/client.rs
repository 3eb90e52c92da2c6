use async_trait::async_trait;
use graphschema_core::{Error, Neo4jConfig};
use neo4rs::{ConfigBuilder, Graph, Query};
use std::sync::Arc;
use tracing::{debug, info};

use super::traits::GraphSession;
use crate::error::QueryError;
use crate::query::{ColumnKind, RawGraph, RawNode, RawRelationship, ReadQuery, Row, Value};

/// Neo4j-backed graph session
///
/// Wraps a pooled [`neo4rs::Graph`]. All queries issued through this client are
/// read-only.
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Connect to Neo4j with the provided configuration and verify the connection
    ///
    /// # Example
    /// ```no_run
    /// use graphschema_core::Neo4jConfig;
    /// use graphschema_storage::Neo4jClient;
    ///
    /// # async fn example(config: &Neo4jConfig) -> graphschema_core::Result<()> {
    /// let client = Neo4jClient::new(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: &Neo4jConfig) -> Result<Self, Error> {
        info!("Connecting to Neo4j at {}", config.uri);

        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size);
        if let Some(database) = &config.database {
            builder = builder.db(database.as_str());
        }
        let neo4j_config = builder
            .build()
            .map_err(|e| Error::connection(format!("Invalid Neo4j configuration: {e}")))?;

        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| Error::connection(format!("Failed to connect to Neo4j: {e}")))?;

        let client = Self {
            graph: Arc::new(graph),
        };
        client
            .ping()
            .await
            .map_err(|e| Error::connection(format!("Neo4j is not reachable: {e}")))?;

        Ok(client)
    }

    fn decode_row(row: &neo4rs::Row, query: &ReadQuery) -> Result<Row, QueryError> {
        let mut decoded = Row::new();
        for column in query.columns() {
            let name = column.name.as_str();
            let value = match column.kind {
                ColumnKind::Bool => row
                    .get::<Option<bool>>(name)
                    .map(|v| v.map_or(Value::Null, Value::Bool)),
                ColumnKind::String => row
                    .get::<Option<String>>(name)
                    .map(|v| v.map_or(Value::Null, Value::String)),
                ColumnKind::StringList => row
                    .get::<Option<Vec<String>>>(name)
                    .map(|v| v.map_or(Value::Null, Value::StringList)),
            }
            .map_err(|e| QueryError::decode(name, e.to_string()))?;
            decoded.insert(name, value);
        }
        Ok(decoded)
    }
}

#[async_trait]
impl GraphSession for Neo4jClient {
    async fn fetch_rows(&self, query: &ReadQuery) -> Result<Vec<Row>, QueryError> {
        debug!(cypher = query.cypher(), "Executing read query");

        let mut cypher = Query::new(query.cypher().to_string());
        for (key, value) in query.params() {
            cypher = cypher.param(key.as_str(), value.as_str());
        }

        let mut stream = self
            .graph
            .execute(cypher)
            .await
            .map_err(QueryError::from_neo4j)?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(QueryError::from_neo4j)? {
            rows.push(Self::decode_row(&row, query)?);
        }
        Ok(rows)
    }

    async fn fetch_graph(&self, cypher: &str) -> Result<RawGraph, QueryError> {
        debug!(cypher, "Fetching schema graph");

        let mut stream = self
            .graph
            .execute(Query::new(cypher.to_string()))
            .await
            .map_err(QueryError::from_neo4j)?;

        let mut raw = RawGraph::default();
        while let Some(row) = stream.next().await.map_err(QueryError::from_neo4j)? {
            let nodes: Vec<neo4rs::Node> = row
                .get("nodes")
                .map_err(|e| QueryError::decode("nodes", e.to_string()))?;
            let relationships: Vec<neo4rs::Relation> = row
                .get("relationships")
                .map_err(|e| QueryError::decode("relationships", e.to_string()))?;

            raw.nodes.extend(nodes.iter().map(|node| RawNode {
                id: node.id(),
                labels: node.labels().iter().map(|l| l.to_string()).collect(),
                name: node.get::<String>("name").ok(),
            }));
            raw.relationships
                .extend(relationships.iter().map(|rel| RawRelationship {
                    id: rel.id(),
                    start_id: rel.start_node_id(),
                    end_id: rel.end_node_id(),
                    rel_type: rel.typ().to_string(),
                }));
        }

        debug!(
            nodes = raw.nodes.len(),
            relationships = raw.relationships.len(),
            "Fetched schema graph"
        );
        Ok(raw)
    }

    async fn ping(&self) -> Result<(), QueryError> {
        let mut stream = self
            .graph
            .execute(Query::new("RETURN 1 AS ok".to_string()))
            .await
            .map_err(QueryError::from_neo4j)?;
        while stream
            .next()
            .await
            .map_err(QueryError::from_neo4j)?
            .is_some()
        {}
        Ok(())
    }
}
