//! Confirmation of schema candidates by existence probing
//!
//! Owners (labels, relationship types, topology entries) are validated
//! independently through a bounded pool and emitted in candidate order, so the
//! order in which probes complete never shows up in the result.

use futures::stream::{self, StreamExt, TryStreamExt};
use graphschema_core::model::{PropertyMap, TopologyMap};
use graphschema_core::{
    validate_identifier, Error, IdentifierKind, PropertyCandidate, Result, TopologyCandidate,
};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::predicate::Predicate;
use crate::prober::ExistenceProbe;

/// One of the three independent schema pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    NodeProperties,
    RelationshipProperties,
    Topology,
}

impl Aspect {
    pub const ALL: [Aspect; 3] = [
        Aspect::NodeProperties,
        Aspect::RelationshipProperties,
        Aspect::Topology,
    ];
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeProperties => write!(f, "node properties"),
            Self::RelationshipProperties => write!(f, "relationship properties"),
            Self::Topology => write!(f, "topology"),
        }
    }
}

/// An owner dropped from the result without failing its aspect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub aspect: Aspect,
    pub owner: String,
    pub message: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dropped from {}: {}", self.owner, self.aspect, self.message)
    }
}

/// Confirmed output of one aspect plus the owners dropped on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validated<T> {
    pub value: T,
    pub warnings: Vec<ValidationWarning>,
}

enum OwnerOutcome<T> {
    Confirmed(T),
    Absent,
    Dropped(ValidationWarning),
}

/// What kind of element owns a property candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyOwner {
    Label,
    RelationshipType,
}

impl PropertyOwner {
    fn aspect(self) -> Aspect {
        match self {
            Self::Label => Aspect::NodeProperties,
            Self::RelationshipType => Aspect::RelationshipProperties,
        }
    }

    fn identifier_kind(self) -> IdentifierKind {
        match self {
            Self::Label => IdentifierKind::Label,
            Self::RelationshipType => IdentifierKind::RelationshipType,
        }
    }

    fn owner_exists(self, owner: &str) -> Predicate {
        match self {
            Self::Label => Predicate::label_exists(owner),
            Self::RelationshipType => Predicate::relationship_type_exists(owner),
        }
    }

    fn property_exists(self, owner: &str, property: &str) -> Predicate {
        match self {
            Self::Label => Predicate::node_property_exists(owner, property),
            Self::RelationshipType => Predicate::relationship_property_exists(owner, property),
        }
    }
}

/// Validates candidates against live data through an [`ExistenceProbe`]
pub struct Validator {
    probe: Arc<dyn ExistenceProbe>,
    workers: usize,
}

impl Validator {
    /// Create a validator processing at most `workers` owners at once
    pub fn new(probe: Arc<dyn ExistenceProbe>, workers: usize) -> Self {
        Self {
            probe,
            workers: workers.max(1),
        }
    }

    /// Keep labels that have at least one node, each with its confirmed properties
    pub async fn validate_node_properties(
        &self,
        candidates: &[PropertyCandidate],
    ) -> Result<Validated<PropertyMap>> {
        self.validate_properties(PropertyOwner::Label, candidates)
            .await
    }

    /// Keep relationship types that have at least one relationship, each with
    /// its confirmed properties
    pub async fn validate_relationship_properties(
        &self,
        candidates: &[PropertyCandidate],
    ) -> Result<Validated<PropertyMap>> {
        self.validate_properties(PropertyOwner::RelationshipType, candidates)
            .await
    }

    /// Keep `(source, relationship)` entries with at least one confirmed target
    pub async fn validate_topology(
        &self,
        candidates: &[TopologyCandidate],
    ) -> Result<Validated<TopologyMap>> {
        let outcomes = self
            .for_each_owner(candidates, |candidate| self.check_topology(candidate))
            .await?;

        let mut validated = Validated::<TopologyMap>::default();
        for (candidate, (outcome, rejected_targets)) in candidates.iter().zip(outcomes) {
            validated.warnings.extend(rejected_targets);
            match outcome {
                OwnerOutcome::Confirmed(targets) => {
                    validated
                        .value
                        .entry(candidate.source.clone())
                        .or_default()
                        .insert(candidate.relationship.clone(), targets);
                }
                OwnerOutcome::Absent => {}
                OwnerOutcome::Dropped(warning) => validated.warnings.push(warning),
            }
        }
        Ok(validated)
    }

    async fn validate_properties(
        &self,
        owner_kind: PropertyOwner,
        candidates: &[PropertyCandidate],
    ) -> Result<Validated<PropertyMap>> {
        let outcomes = self
            .for_each_owner(candidates, |candidate| {
                self.check_properties(owner_kind, candidate)
            })
            .await?;

        let mut validated = Validated::<PropertyMap>::default();
        for (candidate, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                OwnerOutcome::Confirmed(properties) => {
                    validated.value.insert(candidate.owner.clone(), properties);
                }
                OwnerOutcome::Absent => {}
                OwnerOutcome::Dropped(warning) => validated.warnings.push(warning),
            }
        }
        Ok(validated)
    }

    /// Run `check` for every candidate through the bounded pool, returning
    /// outcomes in candidate order
    async fn for_each_owner<'a, C, T, F, Fut>(
        &self,
        candidates: &'a [C],
        check: F,
    ) -> Result<Vec<T>>
    where
        F: Fn(&'a C) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut outcomes: Vec<(usize, T)> = stream::iter(candidates.iter().enumerate())
            .map(|(index, candidate)| {
                let pending = check(candidate);
                async move { pending.await.map(|outcome| (index, outcome)) }
            })
            .buffer_unordered(self.workers)
            .try_collect()
            .await?;

        outcomes.sort_by_key(|(index, _)| *index);
        Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
    }

    async fn check_properties(
        &self,
        owner_kind: PropertyOwner,
        candidate: &PropertyCandidate,
    ) -> Result<OwnerOutcome<Vec<String>>> {
        let aspect = owner_kind.aspect();
        let owner = candidate.owner.as_str();

        let checked = validate_identifier(owner_kind.identifier_kind(), owner).and_then(|_| {
            candidate
                .properties
                .iter()
                .try_for_each(|p| validate_identifier(IdentifierKind::Property, p).map(|_| ()))
        });
        if let Err(e) = checked {
            return drop_owner(aspect, owner, e);
        }

        if !self.probe.exists(&owner_kind.owner_exists(owner)).await? {
            debug!(%aspect, owner, "Owner has no instances, omitting");
            return Ok(OwnerOutcome::Absent);
        }

        let found = futures::future::try_join_all(candidate.properties.iter().map(|property| {
            let predicate = owner_kind.property_exists(owner, property);
            async move { self.probe.exists(&predicate).await }
        }))
        .await?;

        let confirmed: Vec<String> = candidate
            .properties
            .iter()
            .zip(found)
            .filter_map(|(property, exists)| exists.then(|| property.clone()))
            .collect();

        debug!(
            %aspect,
            owner,
            confirmed = confirmed.len(),
            candidates = candidate.properties.len(),
            "Validated properties"
        );
        Ok(OwnerOutcome::Confirmed(confirmed))
    }

    /// Confirm the targets of one `(source, relationship)` entry
    ///
    /// An unsafe source or relationship drops the entry; an unsafe target only
    /// drops that target, and the remaining ones are still probed.
    async fn check_topology(
        &self,
        candidate: &TopologyCandidate,
    ) -> Result<(OwnerOutcome<Vec<String>>, Vec<ValidationWarning>)> {
        let source = candidate.source.as_str();
        let relationship = candidate.relationship.as_str();

        let checked = validate_identifier(IdentifierKind::Label, source)
            .and_then(|_| validate_identifier(IdentifierKind::RelationshipType, relationship));
        if let Err(e) = checked {
            return Ok((drop_owner(Aspect::Topology, source, e)?, Vec::new()));
        }

        let mut safe_targets = Vec::with_capacity(candidate.targets.len());
        let mut rejected = Vec::new();
        for target in &candidate.targets {
            match validate_identifier(IdentifierKind::Label, target) {
                Ok(_) => safe_targets.push(target),
                Err(e) => {
                    let context = format!("target of ({source})-[{relationship}]");
                    rejected.push(owner_warning(Aspect::Topology, target, &context, e)?);
                }
            }
        }

        let found = futures::future::try_join_all(safe_targets.iter().map(|target| {
            let predicate = Predicate::path_exists(source, relationship, target.as_str());
            async move { self.probe.exists(&predicate).await }
        }))
        .await?;

        let confirmed: Vec<String> = safe_targets
            .into_iter()
            .zip(found)
            .filter_map(|(target, exists)| exists.then(|| target.clone()))
            .collect();

        if confirmed.is_empty() {
            debug!(source, relationship, "No target confirmed, omitting");
            return Ok((OwnerOutcome::Absent, rejected));
        }
        Ok((OwnerOutcome::Confirmed(confirmed), rejected))
    }
}

/// Turn an owner-scoped error into a warning; anything else stays fatal
fn drop_owner<T>(aspect: Aspect, owner: &str, error: Error) -> Result<OwnerOutcome<T>> {
    owner_warning(aspect, owner, "", error).map(OwnerOutcome::Dropped)
}

fn owner_warning(
    aspect: Aspect,
    owner: &str,
    context: &str,
    error: Error,
) -> Result<ValidationWarning> {
    if !error.is_owner_scoped() {
        return Err(error);
    }
    warn!(%aspect, owner, "Dropping owner: {error}");
    let message = if context.is_empty() {
        error.to_string()
    } else {
        format!("{context}: {error}")
    };
    Ok(ValidationWarning {
        aspect,
        owner: owner.to_string(),
        message,
    })
}
