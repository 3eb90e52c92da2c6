//! Integration tests for the Neo4j graph session

use anyhow::Result;
use graphschema_core::Neo4jConfig;
use graphschema_storage::{
    create_graph_session, ColumnKind, GraphSession, Neo4jClient, ReadQuery,
};

fn local_config() -> Neo4jConfig {
    Neo4jConfig {
        uri: std::env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://localhost:7687".to_string()),
        user: std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string()),
        password: std::env::var("NEO4J_PASSWORD").unwrap_or_else(|_| "password".to_string()),
        ..Neo4jConfig::default()
    }
}

#[tokio::test]
#[ignore] // Requires Neo4j to be running
async fn test_connect_and_ping() -> Result<()> {
    let session = create_graph_session(&local_config()).await?;
    session.ping().await?;
    Ok(())
}

#[tokio::test]
#[ignore] // Requires Neo4j to be running
async fn test_parameterized_read_query() -> Result<()> {
    let client = Neo4jClient::new(&local_config()).await?;

    let query = ReadQuery::new("RETURN $value AS echoed, true AS flag, ['a', 'b'] AS items")
        .param("value", "hello")
        .column("echoed", ColumnKind::String)
        .column("flag", ColumnKind::Bool)
        .column("items", ColumnKind::StringList);
    let rows = client.fetch_rows(&query).await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_string("echoed")?, Some("hello".to_string()));
    assert_eq!(rows[0].get_bool("flag")?, Some(true));
    assert_eq!(
        rows[0].get_string_list("items")?,
        vec!["a".to_string(), "b".to_string()]
    );
    Ok(())
}

#[tokio::test]
#[ignore] // Requires Neo4j to be running
async fn test_empty_match_returns_no_rows() -> Result<()> {
    let client = Neo4jClient::new(&local_config()).await?;

    let query = ReadQuery::new(
        "MATCH (n:`__graphschema_absent_label__`) RETURN true AS exists LIMIT 1",
    )
    .column("exists", ColumnKind::Bool);
    let rows = client.fetch_rows(&query).await?;

    assert!(rows.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore] // Requires Neo4j to be running
async fn test_schema_visualization_decodes() -> Result<()> {
    let client = Neo4jClient::new(&local_config()).await?;
    let graph = client
        .fetch_graph("CALL db.schema.visualization()")
        .await?;

    for rel in &graph.relationships {
        assert!(!rel.rel_type.is_empty());
    }
    Ok(())
}
