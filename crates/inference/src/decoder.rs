//! Decoding of the raw schema visualization graph into typed records

use graphschema_core::model::{ElementId, NodeRecord, RelationshipRecord};
use graphschema_core::{Error, Result};
use graphschema_storage::RawGraph;
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};

/// Typed records of one decoded topology graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedGraph {
    pub nodes: Vec<NodeRecord>,
    pub relationships: Vec<RelationshipRecord>,
}

/// A resolved `(source label, relationship type, target label)` observation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub source: String,
    pub relationship: String,
    pub target: String,
}

impl Triple {
    pub fn new(
        source: impl Into<String>,
        relationship: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            relationship: relationship.into(),
            target: target.into(),
        }
    }
}

/// Decode a raw graph into node and relationship records
///
/// # Errors
///
/// Returns [`Error::Decode`] when a node id is repeated, a node has no labels,
/// a relationship has an empty type, or a relationship endpoint references a
/// node that is not part of the same graph.
pub fn decode(raw: &RawGraph) -> Result<DecodedGraph> {
    let mut seen = HashSet::with_capacity(raw.nodes.len());
    let mut nodes = Vec::with_capacity(raw.nodes.len());

    for node in &raw.nodes {
        if !seen.insert(node.id) {
            return Err(Error::decode(format!("duplicate node id {}", node.id)));
        }
        let labels: IndexSet<&String> = node.labels.iter().collect();
        if labels.is_empty() {
            return Err(Error::decode(format!("node {} has no labels", node.id)));
        }
        nodes.push(NodeRecord {
            id: node.id,
            labels: labels.into_iter().cloned().collect(),
            name: node.name.clone(),
        });
    }

    let check_endpoint = |rel_id: ElementId, node_id: ElementId| {
        if seen.contains(&node_id) {
            Ok(())
        } else {
            Err(Error::decode(format!(
                "relationship {rel_id} references unknown node {node_id}"
            )))
        }
    };

    let mut relationships = Vec::with_capacity(raw.relationships.len());
    for rel in &raw.relationships {
        if rel.rel_type.is_empty() {
            return Err(Error::decode(format!(
                "relationship {} has an empty type",
                rel.id
            )));
        }
        check_endpoint(rel.id, rel.start_id)?;
        check_endpoint(rel.id, rel.end_id)?;
        relationships.push(RelationshipRecord {
            id: rel.id,
            source_id: rel.start_id,
            target_id: rel.end_id,
            rel_type: rel.rel_type.clone(),
        });
    }

    Ok(DecodedGraph {
        nodes,
        relationships,
    })
}

/// Join relationships against node names, in relationship order
///
/// Endpoints are looked up by id; a node without a display name resolves to
/// its first label.
pub fn resolve_triples(graph: &DecodedGraph) -> Result<Vec<Triple>> {
    let names: HashMap<ElementId, &str> = graph
        .nodes
        .iter()
        .filter_map(|node| node.resolved_name().map(|name| (node.id, name)))
        .collect();

    let lookup = |rel: &RelationshipRecord, id: ElementId| {
        names.get(&id).copied().ok_or_else(|| {
            Error::decode(format!(
                "relationship {} references unknown node {id}",
                rel.id
            ))
        })
    };

    graph
        .relationships
        .iter()
        .map(|rel| {
            Ok(Triple::new(
                lookup(rel, rel.source_id)?,
                rel.rel_type.as_str(),
                lookup(rel, rel.target_id)?,
            ))
        })
        .collect()
}
