//! Data model for schema inference
//!
//! Records and candidates are built once per pipeline run and never mutated
//! afterwards. [`ValidatedSchema`] is the only artifact that outlives a run.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque identifier of a node or relationship within one decoded graph
pub type ElementId = i64;

/// Confirmed properties per owner, in first-seen owner order
pub type PropertyMap = IndexMap<String, Vec<String>>;

/// Confirmed targets per source label and relationship type
pub type TopologyMap = IndexMap<String, IndexMap<String, Vec<String>>>;

/// A node of the schema visualization graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: ElementId,
    /// Non-empty, duplicate-free, in the order the database reported them
    pub labels: Vec<String>,
    /// Display name, absent when the visualization node has no `name` property
    pub name: Option<String>,
}

impl NodeRecord {
    /// Name used when resolving relationships: the display name, else the first label
    pub fn resolved_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.labels.first().map(String::as_str))
    }
}

/// A relationship of the schema visualization graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRecord {
    pub id: ElementId,
    pub source_id: ElementId,
    pub target_id: ElementId,
    pub rel_type: String,
}

/// Properties reported by introspection for a label or relationship type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyCandidate {
    pub owner: String,
    pub properties: IndexSet<String>,
}

impl PropertyCandidate {
    pub fn new<I, S>(owner: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner: owner.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

/// Candidate targets reachable from `source` via `relationship`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyCandidate {
    pub source: String,
    pub relationship: String,
    pub targets: BTreeSet<String>,
}

impl TopologyCandidate {
    pub fn new<I, S>(source: impl Into<String>, relationship: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            relationship: relationship.into(),
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }
}

/// The confirmed schema document
///
/// Serializes to exactly three top-level fields: `node_properties`,
/// `relationship_properties` and `schema`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatedSchema {
    pub node_properties: PropertyMap,
    pub relationship_properties: PropertyMap,
    #[serde(rename = "schema")]
    pub topology: TopologyMap,
}

impl ValidatedSchema {
    /// Confirmed targets for a source label and relationship type, if any
    pub fn targets(&self, source: &str, relationship: &str) -> Option<&[String]> {
        self.topology
            .get(source)
            .and_then(|rels| rels.get(relationship))
            .map(Vec::as_slice)
    }
}
