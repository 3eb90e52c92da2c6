//! Existence predicates and their Cypher form

use graphschema_core::{quote_identifier, validate_identifier, IdentifierKind, Result};
use graphschema_storage::{ColumnKind, ReadQuery};
use std::fmt;

/// Result column every probe query returns
pub const EXISTS_COLUMN: &str = "exists";

/// Shape of the element a probe looks for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    LabelExists {
        label: String,
    },
    /// A node with `label` carrying a non-null `property`
    NodePropertyExists {
        label: String,
        property: String,
    },
    RelationshipTypeExists {
        rel_type: String,
    },
    /// A relationship of `rel_type` carrying a non-null `property`
    RelationshipPropertyExists {
        rel_type: String,
        property: String,
    },
    /// A `relationship` between `source` and `target` in either direction
    PathExists {
        source: String,
        relationship: String,
        target: String,
    },
}

impl Predicate {
    pub fn label_exists(label: impl Into<String>) -> Self {
        Self::LabelExists {
            label: label.into(),
        }
    }

    pub fn node_property_exists(label: impl Into<String>, property: impl Into<String>) -> Self {
        Self::NodePropertyExists {
            label: label.into(),
            property: property.into(),
        }
    }

    pub fn relationship_type_exists(rel_type: impl Into<String>) -> Self {
        Self::RelationshipTypeExists {
            rel_type: rel_type.into(),
        }
    }

    pub fn relationship_property_exists(
        rel_type: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self::RelationshipPropertyExists {
            rel_type: rel_type.into(),
            property: property.into(),
        }
    }

    pub fn path_exists(
        source: impl Into<String>,
        relationship: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::PathExists {
            source: source.into(),
            relationship: relationship.into(),
            target: target.into(),
        }
    }

    /// The label or relationship type this predicate is about
    pub fn owner(&self) -> &str {
        match self {
            Self::LabelExists { label } | Self::NodePropertyExists { label, .. } => label,
            Self::RelationshipTypeExists { rel_type }
            | Self::RelationshipPropertyExists { rel_type, .. } => rel_type,
            Self::PathExists { source, .. } => source,
        }
    }

    /// Build the `LIMIT 1` probe query
    ///
    /// Labels and types are checked against the identifier allow-list and
    /// backtick-quoted; property names are checked too and then bound as the
    /// `$property` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`graphschema_core::Error::UnsafeIdentifier`] for any name that
    /// fails the allow-list.
    pub fn to_query(&self) -> Result<ReadQuery> {
        let query = match self {
            Self::LabelExists { label } => {
                let label = quote_identifier(IdentifierKind::Label, label)?;
                ReadQuery::new(format!(
                    "MATCH (n:{label}) RETURN true AS `{EXISTS_COLUMN}` LIMIT 1"
                ))
            }
            Self::NodePropertyExists { label, property } => {
                let label = quote_identifier(IdentifierKind::Label, label)?;
                let property = validate_identifier(IdentifierKind::Property, property)?;
                ReadQuery::new(format!(
                    "MATCH (n:{label}) WHERE n[$property] IS NOT NULL RETURN true AS `{EXISTS_COLUMN}` LIMIT 1"
                ))
                .param("property", property)
            }
            Self::RelationshipTypeExists { rel_type } => {
                let rel_type = quote_identifier(IdentifierKind::RelationshipType, rel_type)?;
                ReadQuery::new(format!(
                    "MATCH ()-[r:{rel_type}]->() RETURN true AS `{EXISTS_COLUMN}` LIMIT 1"
                ))
            }
            Self::RelationshipPropertyExists { rel_type, property } => {
                let rel_type = quote_identifier(IdentifierKind::RelationshipType, rel_type)?;
                let property = validate_identifier(IdentifierKind::Property, property)?;
                ReadQuery::new(format!(
                    "MATCH ()-[r:{rel_type}]->() WHERE r[$property] IS NOT NULL RETURN true AS `{EXISTS_COLUMN}` LIMIT 1"
                ))
                .param("property", property)
            }
            Self::PathExists {
                source,
                relationship,
                target,
            } => {
                let source = quote_identifier(IdentifierKind::Label, source)?;
                let relationship =
                    quote_identifier(IdentifierKind::RelationshipType, relationship)?;
                let target = quote_identifier(IdentifierKind::Label, target)?;
                ReadQuery::new(format!(
                    "MATCH (:{source})-[:{relationship}]-(:{target}) RETURN true AS `{EXISTS_COLUMN}` LIMIT 1"
                ))
            }
        };
        Ok(query.column(EXISTS_COLUMN, ColumnKind::Bool))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LabelExists { label } => write!(f, "label {label} exists"),
            Self::NodePropertyExists { label, property } => {
                write!(f, "property {property} exists on {label}")
            }
            Self::RelationshipTypeExists { rel_type } => {
                write!(f, "relationship type {rel_type} exists")
            }
            Self::RelationshipPropertyExists { rel_type, property } => {
                write!(f, "property {property} exists on {rel_type}")
            }
            Self::PathExists {
                source,
                relationship,
                target,
            } => write!(f, "path ({source})-[{relationship}]-({target}) exists"),
        }
    }
}
