//! Mock graph session for testing

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::traits::GraphSession;
use crate::error::QueryError;
use crate::query::{RawGraph, ReadQuery, Row};

type RowsResponse = Result<Vec<Row>, QueryError>;

#[derive(Debug, Default)]
struct MockData {
    queued: HashMap<String, VecDeque<RowsResponse>>, // query key -> one-shot responses
    rows: HashMap<String, Vec<Row>>,                 // query key -> standing response
    graph: Option<Result<RawGraph, QueryError>>,
    ping_error: Option<QueryError>,
    delay: Option<Duration>,
    executed: Vec<ReadQuery>,
    in_flight: usize,
    peak_in_flight: usize,
}

/// Scripted graph session for testing
///
/// Responses are keyed by the query text together with its parameters.
/// One-shot responses queued with [`push_response`](Self::push_response) are
/// consumed first, then standing rows set with [`set_rows`](Self::set_rows).
/// Queries with neither return no rows.
#[derive(Clone)]
pub struct MockGraphSession {
    data: Arc<Mutex<MockData>>,
}

impl MockGraphSession {
    /// Create a new mock session
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(MockData::default())),
        }
    }

    fn key(query: &ReadQuery) -> String {
        let mut key = query.cypher().to_string();
        for (name, value) in query.params() {
            key.push_str(&format!("\u{1f}{name}={value}"));
        }
        key
    }

    /// Queue a one-shot response for `query`
    pub fn push_response(&self, query: &ReadQuery, response: RowsResponse) {
        self.data
            .lock()
            .unwrap()
            .queued
            .entry(Self::key(query))
            .or_default()
            .push_back(response);
    }

    /// Set the rows returned for `query` once queued responses run out
    pub fn set_rows(&self, query: &ReadQuery, rows: Vec<Row>) {
        self.data.lock().unwrap().rows.insert(Self::key(query), rows);
    }

    /// Set the outcome of [`GraphSession::fetch_graph`]
    pub fn set_graph(&self, graph: Result<RawGraph, QueryError>) {
        self.data.lock().unwrap().graph = Some(graph);
    }

    /// Make [`GraphSession::ping`] fail
    pub fn fail_ping(&self, error: QueryError) {
        self.data.lock().unwrap().ping_error = Some(error);
    }

    /// Delay every `fetch_rows` call
    pub fn set_delay(&self, delay: Duration) {
        self.data.lock().unwrap().delay = Some(delay);
    }

    /// Number of times `query` was executed
    pub fn call_count(&self, query: &ReadQuery) -> usize {
        let key = Self::key(query);
        self.data
            .lock()
            .unwrap()
            .executed
            .iter()
            .filter(|q| Self::key(q) == key)
            .count()
    }

    /// Highest number of `fetch_rows` calls observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.data.lock().unwrap().peak_in_flight
    }

    /// All queries executed so far, in order
    pub fn executed(&self) -> Vec<ReadQuery> {
        self.data.lock().unwrap().executed.clone()
    }
}

/// Marks a delayed call as finished even when its future is dropped mid-sleep
struct InFlightGuard<'a>(&'a Mutex<MockData>);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap().in_flight -= 1;
    }
}

impl Default for MockGraphSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphSession for MockGraphSession {
    async fn fetch_rows(&self, query: &ReadQuery) -> Result<Vec<Row>, QueryError> {
        let delay = {
            let mut data = self.data.lock().unwrap();
            data.executed.push(query.clone());
            data.in_flight += 1;
            data.peak_in_flight = data.peak_in_flight.max(data.in_flight);
            data.delay
        };

        if let Some(delay) = delay {
            let _guard = InFlightGuard(&self.data);
            tokio::time::sleep(delay).await;
        } else {
            self.data.lock().unwrap().in_flight -= 1;
        }

        let key = Self::key(query);
        let mut data = self.data.lock().unwrap();
        if let Some(response) = data.queued.get_mut(&key).and_then(VecDeque::pop_front) {
            return response;
        }
        Ok(data.rows.get(&key).cloned().unwrap_or_default())
    }

    async fn fetch_graph(&self, _cypher: &str) -> Result<RawGraph, QueryError> {
        self.data
            .lock()
            .unwrap()
            .graph
            .clone()
            .unwrap_or_else(|| Ok(RawGraph::default()))
    }

    async fn ping(&self) -> Result<(), QueryError> {
        match self.data.lock().unwrap().ping_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
