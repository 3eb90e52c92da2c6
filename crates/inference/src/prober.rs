//! Existence probing against a live graph session

use async_trait::async_trait;
use graphschema_core::{Error, Result, ValidationConfig};
use graphschema_storage::{GraphSession, QueryError, ReadQuery, Row};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::predicate::{Predicate, EXISTS_COLUMN};

type AttemptOutcome = std::result::Result<Vec<Row>, QueryError>;

/// Answers whether at least one element matching a predicate exists
#[async_trait]
pub trait ExistenceProbe: Send + Sync {
    async fn exists(&self, predicate: &Predicate) -> Result<bool>;
}

/// [`ExistenceProbe`] issuing `LIMIT 1` Cypher queries through a [`GraphSession`]
///
/// Every round-trip holds a permit of a shared semaphore, so at most
/// `max_concurrent_probes` queries are in flight no matter how many callers
/// probe at once. Transient failures are retried with capped exponential
/// backoff. Once the cancellation token fires no new query is issued.
pub struct CypherProber {
    session: Arc<dyn GraphSession>,
    concurrency_limiter: Arc<Semaphore>,
    config: ValidationConfig,
    cancel: CancellationToken,
}

impl CypherProber {
    pub fn new(
        session: Arc<dyn GraphSession>,
        config: &ValidationConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            concurrency_limiter: Arc::new(Semaphore::new(config.max_concurrent_probes.max(1))),
            config: config.clone(),
            cancel,
        }
    }

    /// Run one attempt while holding a concurrency permit
    async fn attempt(&self, query: &ReadQuery) -> Result<AttemptOutcome> {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            permit = self.concurrency_limiter.acquire() => permit.map_err(|e| {
                Error::Other(anyhow::anyhow!("Failed to acquire probe permit: {e}"))
            })?,
        };

        let probe_timeout = self.config.probe_timeout();
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            outcome = tokio::time::timeout(probe_timeout, self.session.fetch_rows(query)) => outcome,
        };

        Ok(outcome.unwrap_or_else(|_| Err(QueryError::Timeout(probe_timeout.as_millis() as u64))))
    }

    fn interpret(predicate: &Predicate, rows: &[Row]) -> Result<bool> {
        match rows.first() {
            None => Ok(false),
            Some(row) => row
                .get_bool(EXISTS_COLUMN)
                .map(|value| value.unwrap_or(false))
                .map_err(|e| Error::probe(predicate.owner(), predicate.to_string(), e.to_string())),
        }
    }
}

#[async_trait]
impl ExistenceProbe for CypherProber {
    async fn exists(&self, predicate: &Predicate) -> Result<bool> {
        let query = predicate.to_query()?;

        let mut attempt = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            match self.attempt(&query).await? {
                Ok(rows) => {
                    let found = Self::interpret(predicate, &rows)?;
                    debug!(%predicate, found, "Probe complete");
                    return Ok(found);
                }
                Err(e) if e.is_retryable() && attempt < self.config.retry_attempts => {
                    attempt += 1;
                    let backoff = self.config.retry_backoff(attempt);
                    warn!(
                        "Probe '{predicate}' failed: {e}. Retrying in {backoff:?} (attempt {attempt}/{})",
                        self.config.retry_attempts
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
                Err(e) => {
                    let message = if e.is_retryable() {
                        format!("{e} (gave up after {} attempts)", attempt + 1)
                    } else {
                        e.to_string()
                    };
                    return Err(Error::probe(
                        predicate.owner(),
                        predicate.to_string(),
                        message,
                    ));
                }
            }
        }
    }
}
