//! Reduction of directed relationship observations into an undirected adjacency

use crate::decoder::Triple;
use graphschema_core::TopologyCandidate;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Reduce `(source, relationship, target)` triples into topology candidates
///
/// Every observation is registered in both directions: `(S, R, T)` adds `T`
/// under `(S, R)` and `S` under `(T, R)`. Candidates come out in the order
/// their key was first seen, with sorted, duplicate-free target sets.
pub fn reduce<'a, I>(triples: I) -> Vec<TopologyCandidate>
where
    I: IntoIterator<Item = &'a Triple>,
{
    let mut adjacency: IndexMap<(&str, &str), BTreeSet<&str>> = IndexMap::new();

    for triple in triples {
        let rel = triple.relationship.as_str();
        adjacency
            .entry((triple.source.as_str(), rel))
            .or_default()
            .insert(triple.target.as_str());
        adjacency
            .entry((triple.target.as_str(), rel))
            .or_default()
            .insert(triple.source.as_str());
    }

    adjacency
        .into_iter()
        .map(|((source, rel), targets)| TopologyCandidate::new(source, rel, targets))
        .collect()
}
