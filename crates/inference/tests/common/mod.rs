//! Shared fixtures for inference integration tests

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use graphschema_core::{Error, Result};
use graphschema_inference::introspection::{node_properties_query, relationship_properties_query};
use graphschema_inference::{ExistenceProbe, Predicate};
use graphschema_storage::{MockGraphSession, RawGraph, RawNode, RawRelationship, Row, Value};
use std::collections::HashSet;
use std::sync::Mutex;

struct MemNode {
    labels: Vec<String>,
    properties: HashSet<String>,
}

struct MemRelationship {
    start: usize,
    end: usize,
    rel_type: String,
    properties: HashSet<String>,
}

/// In-memory property graph answering existence predicates
///
/// Only non-null properties are stored, so presence in a node's property set
/// is exactly what `n[$property] IS NOT NULL` tests.
#[derive(Default)]
pub struct InMemoryGraph {
    nodes: Vec<MemNode>,
    relationships: Vec<MemRelationship>,
    failing: Mutex<Option<Predicate>>,
    probes: Mutex<Vec<Predicate>>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index
    pub fn node(&mut self, labels: &[&str], properties: &[&str]) -> usize {
        self.nodes.push(MemNode {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        });
        self.nodes.len() - 1
    }

    pub fn relationship(&mut self, start: usize, rel_type: &str, end: usize, properties: &[&str]) {
        self.relationships.push(MemRelationship {
            start,
            end,
            rel_type: rel_type.to_string(),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        });
    }

    /// Make probes for `predicate` fail with a probe error
    pub fn fail_on(&self, predicate: Predicate) {
        *self.failing.lock().unwrap() = Some(predicate);
    }

    /// Every predicate probed so far, in call order
    pub fn probes(&self) -> Vec<Predicate> {
        self.probes.lock().unwrap().clone()
    }

    fn has_label(&self, index: usize, label: &str) -> bool {
        self.nodes[index].labels.iter().any(|l| l == label)
    }

    fn evaluate(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::LabelExists { label } => {
                self.nodes.iter().any(|n| n.labels.contains(label))
            }
            Predicate::NodePropertyExists { label, property } => self
                .nodes
                .iter()
                .any(|n| n.labels.contains(label) && n.properties.contains(property)),
            Predicate::RelationshipTypeExists { rel_type } => {
                self.relationships.iter().any(|r| &r.rel_type == rel_type)
            }
            Predicate::RelationshipPropertyExists { rel_type, property } => self
                .relationships
                .iter()
                .any(|r| &r.rel_type == rel_type && r.properties.contains(property)),
            Predicate::PathExists {
                source,
                relationship,
                target,
            } => self.relationships.iter().any(|r| {
                &r.rel_type == relationship
                    && ((self.has_label(r.start, source) && self.has_label(r.end, target))
                        || (self.has_label(r.start, target) && self.has_label(r.end, source)))
            }),
        }
    }
}

#[async_trait]
impl ExistenceProbe for InMemoryGraph {
    async fn exists(&self, predicate: &Predicate) -> Result<bool> {
        // Same guard the Cypher prober applies before building a query
        predicate.to_query()?;
        self.probes.lock().unwrap().push(predicate.clone());

        if self.failing.lock().unwrap().as_ref() == Some(predicate) {
            return Err(Error::probe(
                predicate.owner(),
                predicate.to_string(),
                "connection reset by peer",
            ));
        }
        Ok(self.evaluate(predicate))
    }
}

fn property_rows(owner_column: &str, rows: &[(&str, Vec<&str>)]) -> Vec<Row> {
    rows.iter()
        .map(|(owner, properties)| {
            Row::new()
                .with(owner_column, Value::String(owner.to_string()))
                .with(
                    "properties",
                    Value::StringList(properties.iter().map(|p| p.to_string()).collect()),
                )
        })
        .collect()
}

/// Script the introspection responses of a mock session
pub fn script_introspection(
    session: &MockGraphSession,
    labels: &[(&str, Vec<&str>)],
    rel_types: &[(&str, Vec<&str>)],
    topology: &[(&str, &str, &str)],
) {
    session.set_rows(&node_properties_query(), property_rows("label", labels));
    session.set_rows(
        &relationship_properties_query(),
        property_rows("relType", rel_types),
    );
    session.set_graph(Ok(visualization(topology)));
}

/// Build a visualization graph with one node per distinct label
pub fn visualization(triples: &[(&str, &str, &str)]) -> RawGraph {
    let mut graph = RawGraph::default();
    let mut ids: Vec<String> = Vec::new();
    let mut id_of = |label: &str, graph: &mut RawGraph| -> i64 {
        if let Some(pos) = ids.iter().position(|l| l == label) {
            return -(pos as i64) - 1;
        }
        ids.push(label.to_string());
        let id = -(ids.len() as i64);
        graph.nodes.push(RawNode {
            id,
            labels: vec![label.to_string()],
            name: Some(label.to_string()),
        });
        id
    };

    for (index, &(source, rel_type, target)) in triples.iter().enumerate() {
        let start_id = id_of(source, &mut graph);
        let end_id = id_of(target, &mut graph);
        graph.relationships.push(RawRelationship {
            id: 1000 + index as i64,
            start_id,
            end_id,
            rel_type: rel_type.to_string(),
        });
    }
    graph
}
