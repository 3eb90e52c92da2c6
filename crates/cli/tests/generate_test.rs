//! Tests for the generate and check commands against a scripted session

use graphschema::{check, generate, GenerateOptions};
use graphschema_core::Config;
use graphschema_inference::introspection::{node_properties_query, relationship_properties_query};
use graphschema_inference::Predicate;
use graphschema_storage::{MockGraphSession, QueryError, Row, Value};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn exists() -> Vec<Row> {
    vec![Row::new().with("exists", Value::Bool(true))]
}

fn scripted_session() -> MockGraphSession {
    let session = MockGraphSession::new();
    session.set_rows(
        &node_properties_query(),
        vec![Row::new()
            .with("label", Value::String("Person".to_string()))
            .with(
                "properties",
                Value::StringList(vec!["name".to_string(), "nickname".to_string()]),
            )],
    );
    session.set_rows(&relationship_properties_query(), vec![]);

    for predicate in [
        Predicate::label_exists("Person"),
        Predicate::node_property_exists("Person", "name"),
    ] {
        session.set_rows(&predicate.to_query().unwrap(), exists());
    }
    session
}

fn config_writing_to(path: PathBuf) -> Config {
    let mut config = Config::default();
    config.output.path = path;
    config
}

#[test]
fn test_options_override_config() {
    let mut config = Config::default();
    let options = GenerateOptions {
        output: Some(PathBuf::from("out/iyp-schema.json")),
        workers: Some(3),
        pretty: true,
        ..GenerateOptions::default()
    };
    options.apply(&mut config);

    assert_eq!(config.output.path, PathBuf::from("out/iyp-schema.json"));
    assert_eq!(config.validation.max_concurrent_probes, 3);
    assert!(config.output.pretty);
}

#[test]
fn test_absent_options_keep_config() {
    let mut config = Config::default();
    GenerateOptions::default().apply(&mut config);
    assert_eq!(config.output.path, PathBuf::from("neo4j-schema.json"));
    assert_eq!(config.validation.max_concurrent_probes, 8);
}

#[tokio::test]
async fn test_generate_writes_confirmed_document() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("neo4j-schema.json");
    let config = config_writing_to(output.clone());

    let report = generate(
        Arc::new(scripted_session()),
        &config,
        None,
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(report.schema.node_properties["Person"], vec!["name"]);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        written,
        serde_json::json!({
            "node_properties": { "Person": ["name"] },
            "relationship_properties": {},
            "schema": {}
        })
    );
}

#[tokio::test]
async fn test_failed_generation_only_writes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("neo4j-schema.json");
    let partial = dir.path().join("neo4j-schema.partial.json");
    let config = config_writing_to(output.clone());

    let session = scripted_session();
    session.set_graph(Err(QueryError::Failed("procedure not found".to_string())));

    let result = generate(
        Arc::new(session),
        &config,
        Some(partial.as_path()),
        CancellationToken::new(),
    )
    .await;

    assert!(result.is_err());
    assert!(!output.exists());

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&partial).unwrap()).unwrap();
    assert_eq!(written["failed_aspects"], serde_json::json!(["topology"]));
    assert_eq!(written["node_properties"]["Person"], serde_json::json!(["name"]));
}

#[tokio::test]
async fn test_cancelled_generation_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("neo4j-schema.json");
    let partial = dir.path().join("neo4j-schema.partial.json");
    let config = config_writing_to(output.clone());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = generate(
        Arc::new(scripted_session()),
        &config,
        Some(partial.as_path()),
        cancel,
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<graphschema_core::Error>(),
        Some(graphschema_core::Error::Cancelled)
    ));
    assert!(!output.exists());
    assert!(!partial.exists());
}

#[tokio::test]
async fn test_check_reports_unreachable_database() {
    let session = MockGraphSession::new();
    assert!(check(&session).await.is_ok());

    session.fail_ping(QueryError::ConnectionFailed("connection refused".to_string()));
    let err = check(&session).await.unwrap_err();
    assert!(err.to_string().contains("Neo4j connection check failed"));
}
