//! Candidate discovery through the database's schema procedures

use graphschema_core::{Error, PropertyCandidate, Result, TopologyCandidate};
use graphschema_storage::{ColumnKind, GraphSession, ReadQuery, Row};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::decoder::{decode, resolve_triples};
use crate::reducer::reduce;
use crate::validator::Aspect;

const NODE_PROPERTIES_CYPHER: &str = "CALL db.schema.nodeTypeProperties() \
YIELD nodeLabels, propertyName \
WITH head(nodeLabels) AS label, collect(propertyName) AS properties \
WHERE label IS NOT NULL \
RETURN label, properties \
ORDER BY label";

const RELATIONSHIP_PROPERTIES_CYPHER: &str = "CALL db.schema.relTypeProperties() \
YIELD relType, propertyName \
WITH relType, collect(propertyName) AS properties \
RETURN relType, properties \
ORDER BY relType";

/// Procedure returning the schema visualization graph
pub const SCHEMA_VISUALIZATION_CYPHER: &str = "CALL db.schema.visualization()";

/// `(label, properties)` rows, multi-label nodes attributed to their first label
pub fn node_properties_query() -> ReadQuery {
    ReadQuery::new(NODE_PROPERTIES_CYPHER)
        .column("label", ColumnKind::String)
        .column("properties", ColumnKind::StringList)
}

/// `(relType, properties)` rows with decorated type names
pub fn relationship_properties_query() -> ReadQuery {
    ReadQuery::new(RELATIONSHIP_PROPERTIES_CYPHER)
        .column("relType", ColumnKind::String)
        .column("properties", ColumnKind::StringList)
}

/// Strip the decoration `db.schema.relTypeProperties()` puts around type names
///
/// ``:`KNOWS` `` becomes `KNOWS`; doubled backticks inside a quoted name
/// collapse to one.
pub fn unescape_rel_type(decorated: &str) -> String {
    let name = decorated.strip_prefix(':').unwrap_or(decorated);
    match name
        .strip_prefix('`')
        .and_then(|inner| inner.strip_suffix('`'))
    {
        Some(inner) => inner.replace("``", "`"),
        None => name.to_string(),
    }
}

/// Node property candidates in query order
pub async fn node_property_candidates(
    session: &dyn GraphSession,
) -> Result<Vec<PropertyCandidate>> {
    let aspect = Aspect::NodeProperties;
    let rows = session
        .fetch_rows(&node_properties_query())
        .await
        .map_err(|e| Error::introspection(aspect.to_string(), e.to_string()))?;
    info!("Introspected {} label rows", rows.len());

    property_candidates(aspect, &rows, "label", |label| label.to_string())
}

/// Relationship property candidates in query order, type names unescaped
pub async fn relationship_property_candidates(
    session: &dyn GraphSession,
) -> Result<Vec<PropertyCandidate>> {
    let aspect = Aspect::RelationshipProperties;
    let rows = session
        .fetch_rows(&relationship_properties_query())
        .await
        .map_err(|e| Error::introspection(aspect.to_string(), e.to_string()))?;
    info!("Introspected {} relationship type rows", rows.len());

    property_candidates(aspect, &rows, "relType", unescape_rel_type)
}

/// Topology candidates from the schema visualization graph
pub async fn topology_candidates(session: &dyn GraphSession) -> Result<Vec<TopologyCandidate>> {
    let raw = session
        .fetch_graph(SCHEMA_VISUALIZATION_CYPHER)
        .await
        .map_err(|e| Error::introspection(Aspect::Topology.to_string(), e.to_string()))?;
    info!(
        "Introspected schema graph with {} nodes and {} relationships",
        raw.nodes.len(),
        raw.relationships.len()
    );

    let decoded = decode(&raw)?;
    let triples = resolve_triples(&decoded)?;
    let candidates = reduce(&triples);
    debug!("Reduced {} triples to {} topology candidates", triples.len(), candidates.len());
    Ok(candidates)
}

fn property_candidates(
    aspect: Aspect,
    rows: &[Row],
    owner_column: &str,
    owner_name: impl Fn(&str) -> String,
) -> Result<Vec<PropertyCandidate>> {
    let mut merged: IndexMap<String, Vec<String>> = IndexMap::new();

    for row in rows {
        let decode_err = |e: graphschema_storage::QueryError| {
            Error::introspection(aspect.to_string(), e.to_string())
        };
        let Some(owner) = row.get_string(owner_column).map_err(decode_err)? else {
            continue;
        };
        let properties = row.get_string_list("properties").map_err(decode_err)?;
        merged
            .entry(owner_name(&owner))
            .or_default()
            .extend(properties);
    }

    Ok(merged
        .into_iter()
        .map(|(owner, properties)| PropertyCandidate::new(owner, properties))
        .collect())
}
