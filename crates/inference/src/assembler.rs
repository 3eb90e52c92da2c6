//! Composition of the three validated aspects into one schema document

use graphschema_core::model::{PropertyMap, TopologyMap};
use graphschema_core::{Error, Result, ValidatedSchema, ValidationConfig};
use graphschema_storage::GraphSession;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error as ThisError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::introspection;
use crate::prober::{CypherProber, ExistenceProbe};
use crate::validator::{Aspect, Validated, ValidationWarning, Validator};

/// A fully confirmed schema and the owners dropped while building it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    pub schema: ValidatedSchema,
    pub warnings: Vec<ValidationWarning>,
}

/// Degraded result of a run where at least one aspect failed
///
/// Never written to the canonical output path. Serializes with an explicit
/// `failed_aspects` field so it cannot be mistaken for a complete document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialSchema {
    pub node_properties: Option<PropertyMap>,
    pub relationship_properties: Option<PropertyMap>,
    #[serde(rename = "schema")]
    pub topology: Option<TopologyMap>,
    pub failed_aspects: Vec<Aspect>,
}

/// Why assembly did not produce a complete schema
#[derive(Debug, ThisError)]
pub enum AssemblyError {
    #[error("Schema generation cancelled")]
    Cancelled,

    #[error("Schema generation failed for {}", describe_failures(.failures))]
    Incomplete {
        failures: Vec<(Aspect, Error)>,
        partial: PartialSchema,
    },
}

fn describe_failures(failures: &[(Aspect, Error)]) -> String {
    failures
        .iter()
        .map(|(aspect, err)| format!("{aspect} ({err})"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AssemblyError {
    /// The labeled partial document, when assembly was not cancelled
    pub fn partial(&self) -> Option<&PartialSchema> {
        match self {
            Self::Cancelled => None,
            Self::Incomplete { partial, .. } => Some(partial),
        }
    }
}

impl From<AssemblyError> for Error {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::Cancelled => Error::Cancelled,
            other => Error::Other(anyhow::Error::new(other)),
        }
    }
}

/// Runs introspection and validation for all three aspects over one session
pub struct SchemaAssembler {
    session: Arc<dyn GraphSession>,
    validator: Validator,
    cancel: CancellationToken,
}

impl SchemaAssembler {
    /// Create an assembler validating through `probe` with `workers` owners in flight
    pub fn new(
        session: Arc<dyn GraphSession>,
        probe: Arc<dyn ExistenceProbe>,
        workers: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            validator: Validator::new(probe, workers),
            cancel,
        }
    }

    /// Create an assembler probing the same session with Cypher queries
    pub fn from_session(
        session: Arc<dyn GraphSession>,
        config: &ValidationConfig,
        cancel: CancellationToken,
    ) -> Self {
        let probe = Arc::new(CypherProber::new(session.clone(), config, cancel.clone()));
        Self::new(session, probe, config.max_concurrent_probes, cancel)
    }

    /// Build the schema, succeeding only if every aspect succeeds
    pub async fn assemble(&self) -> std::result::Result<SchemaReport, AssemblyError> {
        if self.cancel.is_cancelled() {
            return Err(AssemblyError::Cancelled);
        }

        let (nodes, relationships, topology) = tokio::join!(
            self.guarded(Aspect::NodeProperties, self.node_properties()),
            self.guarded(Aspect::RelationshipProperties, self.relationship_properties()),
            self.guarded(Aspect::Topology, self.topology()),
        );

        if self.cancel.is_cancelled()
            || [
                nodes.as_ref().err(),
                relationships.as_ref().err(),
                topology.as_ref().err(),
            ]
            .into_iter()
            .flatten()
            .any(|e| matches!(e, Error::Cancelled))
        {
            return Err(AssemblyError::Cancelled);
        }

        let mut partial = PartialSchema::default();
        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        match nodes {
            Ok(validated) => {
                warnings.extend(validated.warnings);
                partial.node_properties = Some(validated.value);
            }
            Err(e) => failures.push((Aspect::NodeProperties, e)),
        }
        match relationships {
            Ok(validated) => {
                warnings.extend(validated.warnings);
                partial.relationship_properties = Some(validated.value);
            }
            Err(e) => failures.push((Aspect::RelationshipProperties, e)),
        }
        match topology {
            Ok(validated) => {
                warnings.extend(validated.warnings);
                partial.topology = Some(validated.value);
            }
            Err(e) => failures.push((Aspect::Topology, e)),
        }

        match partial {
            PartialSchema {
                node_properties: Some(node_properties),
                relationship_properties: Some(relationship_properties),
                topology: Some(topology),
                ..
            } => Ok(SchemaReport {
                schema: ValidatedSchema {
                    node_properties,
                    relationship_properties,
                    topology,
                },
                warnings,
            }),
            mut partial => {
                partial.failed_aspects = failures.iter().map(|(aspect, _)| *aspect).collect();
                Err(AssemblyError::Incomplete { failures, partial })
            }
        }
    }

    /// Abandon `work` when cancellation fires and log the aspect's outcome
    async fn guarded<T, F>(&self, aspect: Aspect, work: F) -> Result<Validated<T>>
    where
        F: Future<Output = Result<Validated<T>>>,
    {
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            outcome = work => outcome,
        };
        match &outcome {
            Ok(validated) => info!(
                "Validated {aspect} with {} owner(s) dropped",
                validated.warnings.len()
            ),
            Err(Error::Cancelled) => {}
            Err(e) => error!("Failed to validate {aspect}: {e}"),
        }
        outcome
    }

    async fn node_properties(&self) -> Result<Validated<PropertyMap>> {
        let candidates = introspection::node_property_candidates(self.session.as_ref()).await?;
        self.validator.validate_node_properties(&candidates).await
    }

    async fn relationship_properties(&self) -> Result<Validated<PropertyMap>> {
        let candidates =
            introspection::relationship_property_candidates(self.session.as_ref()).await?;
        self.validator
            .validate_relationship_properties(&candidates)
            .await
    }

    async fn topology(&self) -> Result<Validated<TopologyMap>> {
        let candidates = introspection::topology_candidates(self.session.as_ref()).await?;
        self.validator.validate_topology(&candidates).await
    }
}
