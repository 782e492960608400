//! Sharing-edge adjacency structure.
//!
//! Edges are indexed by project id in both directions so that reciprocal
//! edges are found by a lookup instead of a traversal.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::config::OverAllocationPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{CostSharingEdge, Period, ProjectId};

/// The set of cost-sharing edges, keyed by source and by destination.
///
/// # Example
///
/// ```
/// use roster_cost_engine::config::OverAllocationPolicy;
/// use roster_cost_engine::models::{CostSharingEdge, Percentage, ProjectId};
/// use roster_cost_engine::store::SharingGraph;
/// use rust_decimal::Decimal;
///
/// let mut graph = SharingGraph::default();
/// let pct = |v| Percentage::new(Decimal::new(v, 0)).unwrap();
/// graph.insert(CostSharingEdge::new("a", "b", pct(30)), OverAllocationPolicy::Warn).unwrap();
///
/// let (a, b) = (ProjectId::new("a"), ProjectId::new("b"));
/// assert!(graph.would_create_reciprocal(&b, &a));
/// assert!(!graph.would_create_reciprocal(&a, &b));
/// assert_eq!(graph.incoming(&b).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharingGraph {
    outgoing: HashMap<ProjectId, BTreeMap<ProjectId, CostSharingEdge>>,
    incoming: HashMap<ProjectId, BTreeSet<ProjectId>>,
}

impl SharingGraph {
    /// Adds an edge.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the edge is self-referential, has an
    /// inverted effective window, duplicates an existing (source, destination)
    /// pair, or, under [`OverAllocationPolicy::Reject`], would push the
    /// source's outgoing total above 100% in some period the edge applies to.
    pub fn insert(
        &mut self,
        edge: CostSharingEdge,
        policy: OverAllocationPolicy,
    ) -> EngineResult<()> {
        edge.validate()?;

        if self.edge(&edge.source, &edge.destination).is_some() {
            return Err(EngineError::invalid(
                "destination",
                format!(
                    "project {} already shares cost with {}",
                    edge.source, edge.destination
                ),
            ));
        }

        if policy == OverAllocationPolicy::Reject {
            let total = self.peak_outgoing_with(&edge);
            if total > Decimal::ONE_HUNDRED {
                return Err(EngineError::invalid(
                    "percentage",
                    format!(
                        "project {} would share out {}% in total",
                        edge.source, total
                    ),
                ));
            }
        }

        self.incoming
            .entry(edge.destination.clone())
            .or_default()
            .insert(edge.source.clone());
        self.outgoing
            .entry(edge.source.clone())
            .or_default()
            .insert(edge.destination.clone(), edge);
        Ok(())
    }

    /// Removes the edge from `source` to `destination`, returning it.
    pub fn remove(
        &mut self,
        source: &ProjectId,
        destination: &ProjectId,
    ) -> Option<CostSharingEdge> {
        let edge = self.outgoing.get_mut(source)?.remove(destination)?;
        if let Some(sources) = self.incoming.get_mut(destination) {
            sources.remove(source);
        }
        Some(edge)
    }

    /// The edge from `source` to `destination`, if any.
    pub fn edge(&self, source: &ProjectId, destination: &ProjectId) -> Option<&CostSharingEdge> {
        self.outgoing.get(source)?.get(destination)
    }

    /// Edges where `project` is the source, ordered by destination.
    pub fn outgoing(&self, project: &ProjectId) -> Vec<&CostSharingEdge> {
        self.outgoing
            .get(project)
            .map(|edges| edges.values().collect())
            .unwrap_or_default()
    }

    /// Edges where `project` is the destination, ordered by source.
    pub fn incoming(&self, project: &ProjectId) -> Vec<&CostSharingEdge> {
        self.incoming
            .get(project)
            .map(|sources| {
                sources
                    .iter()
                    .filter_map(|source| self.edge(source, project))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether adding `source → destination` would complete a reciprocal
    /// pair, i.e. the reverse edge is already stored.
    pub fn would_create_reciprocal(&self, source: &ProjectId, destination: &ProjectId) -> bool {
        self.edge(source, destination).is_none() && self.edge(destination, source).is_some()
    }

    /// Σ percentage over the outgoing edges of `project` in force in `period`.
    pub fn outgoing_total(&self, project: &ProjectId, period: Period) -> Decimal {
        self.outgoing(project)
            .iter()
            .filter(|edge| edge.applies_to(period))
            .map(|edge| edge.percentage.value())
            .sum()
    }

    /// Highest outgoing total of `edge.source`, `edge` included, over the
    /// periods `edge` applies to.
    fn peak_outgoing_with(&self, edge: &CostSharingEdge) -> Decimal {
        let existing = self.outgoing(&edge.source);

        // The total only rises where an edge starts, so the new edge's first
        // period and every start inside its window cover the maximum.
        let mut starts = vec![edge.effective_from];
        starts.extend(
            existing
                .iter()
                .filter_map(|other| other.effective_from)
                .filter(|start| edge.applies_to(*start))
                .map(Some),
        );

        let peak = starts
            .into_iter()
            .map(|start| match start {
                Some(period) => self.outgoing_total(&edge.source, period),
                // Before every bounded period only open-start edges apply.
                None => existing
                    .iter()
                    .filter(|other| other.effective_from.is_none())
                    .map(|other| other.percentage.value())
                    .sum(),
            })
            .max()
            .unwrap_or(Decimal::ZERO);
        peak + edge.percentage.value()
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.outgoing.values().map(BTreeMap::len).sum()
    }

    /// Whether the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
