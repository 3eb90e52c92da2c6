use graphschema_core::Error as CoreError;
use neo4rs::{Neo4jClientErrorKind, Neo4jErrorKind};
use thiserror::Error;

/// Query-layer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Transient database error: {0}")]
    Transient(String),

    #[error("Operation timeout after {0}ms")]
    Timeout(u64),

    #[error("Query failed: {0}")]
    Failed(String),

    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl QueryError {
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the same query may succeed
    ///
    /// Connection drops, transient server states and timeouts are retryable.
    /// Server-side query failures and decode failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Transient(_) | Self::Timeout(_)
        )
    }

    /// Classify a driver error
    pub(crate) fn from_neo4j(err: neo4rs::Error) -> Self {
        let message = err.to_string();
        match err {
            neo4rs::Error::IOError { .. } => Self::Transient(message),
            neo4rs::Error::ConnectionError { .. } => Self::ConnectionFailed(message),
            neo4rs::Error::Neo4j(server) => Self::from_server_kind(server.kind(), message),
            _ => Self::Failed(message),
        }
    }

    /// Classify a server-reported failure by its status code class
    ///
    /// `Neo.TransientError.*` (leader switches, unavailable databases, lock
    /// timeouts) and expired sessions may succeed when retried.
    fn from_server_kind(kind: Neo4jErrorKind, message: String) -> Self {
        match kind {
            Neo4jErrorKind::Transient
            | Neo4jErrorKind::Client(Neo4jClientErrorKind::SessionExpired) => {
                Self::Transient(message)
            }
            _ => Self::Failed(message),
        }
    }
}

impl From<QueryError> for CoreError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::ConnectionFailed(msg) => CoreError::connection(msg),
            other => CoreError::Other(anyhow::Error::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(QueryError::ConnectionFailed("reset".into()).is_retryable());
        assert!(QueryError::Transient("leader switch".into()).is_retryable());
        assert!(QueryError::Timeout(30_000).is_retryable());
        assert!(!QueryError::Failed("Invalid input 'MATC'".into()).is_retryable());
        assert!(!QueryError::decode("exists", "column missing").is_retryable());
    }

    #[test]
    fn test_server_transient_errors_are_retryable() {
        for code in [
            "Neo.TransientError.General.DatabaseUnavailable",
            "Neo.TransientError.Cluster.NotALeader",
            "Neo.TransientError.Transaction.DeadlockDetected",
            "Neo.ClientError.Cluster.NotALeader",
        ] {
            let err = QueryError::from_server_kind(Neo4jErrorKind::from(code), code.to_string());
            assert!(err.is_retryable(), "{code}");
            assert!(matches!(err, QueryError::Transient(_)));
        }
    }

    #[test]
    fn test_server_client_errors_are_not_retried() {
        for code in [
            "Neo.ClientError.Statement.SyntaxError",
            "Neo.ClientError.Procedure.ProcedureNotFound",
            "Neo.DatabaseError.General.UnknownError",
        ] {
            let err = QueryError::from_server_kind(Neo4jErrorKind::from(code), code.to_string());
            assert!(matches!(err, QueryError::Failed(_)), "{code}");
        }
    }

    #[test]
    fn test_connection_failure_maps_to_core_connection_error() {
        let err: CoreError = QueryError::ConnectionFailed("refused".into()).into();
        assert!(matches!(err, CoreError::Connection(_)));

        let err: CoreError = QueryError::Timeout(5).into();
        assert!(err.to_string().contains("Operation timeout after 5ms"));
    }
}
