//! Cypher prober behavior against a scripted session

use graphschema_core::{Error, ValidationConfig};
use graphschema_inference::predicate::EXISTS_COLUMN;
use graphschema_inference::{CypherProber, ExistenceProbe, Predicate};
use graphschema_storage::{MockGraphSession, QueryError, Row, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn config() -> ValidationConfig {
    ValidationConfig {
        max_concurrent_probes: 2,
        probe_timeout_secs: 5,
        retry_attempts: 3,
        retry_backoff_ms: 100,
        max_retry_backoff_ms: 1_000,
    }
}

fn found() -> Vec<Row> {
    vec![Row::new().with(EXISTS_COLUMN, Value::Bool(true))]
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let mock = MockGraphSession::new();
    let predicate = Predicate::node_property_exists("Person", "name");
    let query = predicate.to_query().unwrap();
    mock.push_response(&query, Err(QueryError::Transient("connection reset".into())));
    mock.push_response(&query, Err(QueryError::ConnectionFailed("broken pipe".into())));
    mock.set_rows(&query, found());

    let prober = CypherProber::new(Arc::new(mock.clone()), &config(), CancellationToken::new());
    assert!(prober.exists(&predicate).await.unwrap());
    assert_eq!(mock.call_count(&query), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retries_are_bounded() {
    let mock = MockGraphSession::new();
    let predicate = Predicate::label_exists("Person");
    let query = predicate.to_query().unwrap();
    for _ in 0..10 {
        mock.push_response(&query, Err(QueryError::Transient("unavailable".into())));
    }

    let prober = CypherProber::new(Arc::new(mock.clone()), &config(), CancellationToken::new());
    let err = prober.exists(&predicate).await.unwrap_err();

    assert!(matches!(err, Error::Probe { .. }));
    assert!(err.to_string().contains("gave up after 4 attempts"));
    assert_eq!(mock.call_count(&query), 4);
}

#[tokio::test]
async fn test_malformed_query_failures_are_not_retried() {
    let mock = MockGraphSession::new();
    let predicate = Predicate::relationship_type_exists("KNOWS");
    let query = predicate.to_query().unwrap();
    mock.push_response(
        &query,
        Err(QueryError::Failed("Invalid input 'LIMT'".into())),
    );
    mock.set_rows(&query, found());

    let prober = CypherProber::new(Arc::new(mock.clone()), &config(), CancellationToken::new());
    let err = prober.exists(&predicate).await.unwrap_err();

    match err {
        Error::Probe {
            owner,
            predicate,
            message,
        } => {
            assert_eq!(owner, "KNOWS");
            assert_eq!(predicate, "relationship type KNOWS exists");
            assert!(message.contains("Invalid input"));
        }
        other => panic!("expected probe error, got {other:?}"),
    }
    assert_eq!(mock.call_count(&query), 1);
}

#[tokio::test]
async fn test_cancelled_token_issues_no_query() {
    let mock = MockGraphSession::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let prober = CypherProber::new(Arc::new(mock.clone()), &config(), cancel);
    let result = prober.exists(&Predicate::label_exists("Person")).await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(mock.executed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_abandons_backoff() {
    let mock = MockGraphSession::new();
    let predicate = Predicate::label_exists("Person");
    let query = predicate.to_query().unwrap();
    mock.push_response(&query, Err(QueryError::Transient("unavailable".into())));
    mock.set_rows(&query, found());

    let cancel = CancellationToken::new();
    let slow_backoff = ValidationConfig {
        retry_backoff_ms: 60_000,
        max_retry_backoff_ms: 60_000,
        ..config()
    };
    let prober = CypherProber::new(Arc::new(mock.clone()), &slow_backoff, cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    });
    let result = prober.exists(&predicate).await;
    canceller.await.unwrap();

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(mock.call_count(&query), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_bounded_by_semaphore() {
    let mock = MockGraphSession::new();
    mock.set_delay(Duration::from_millis(50));
    let prober = Arc::new(CypherProber::new(
        Arc::new(mock.clone()),
        &config(),
        CancellationToken::new(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let prober = prober.clone();
            tokio::spawn(async move {
                prober
                    .exists(&Predicate::label_exists(format!("Label{i}")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        assert!(!handle.await.unwrap().unwrap());
    }

    assert_eq!(mock.executed().len(), 8);
    assert_eq!(mock.peak_in_flight(), 2);
}
