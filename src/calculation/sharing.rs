//! Cost-sharing resolution.
//!
//! Given a project's original cost and the edges in force for a period, this
//! module computes how much cost the project hands out, how much it receives
//! and what it is left with.
//!
//! Shared-in amounts are always based on the source's *original* cost, so a
//! chain A → B → C moves A's cost to B only; nothing compounds along the chain.

use rust_decimal::Decimal;

use crate::config::OverAllocationPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CostSharingEdge, CostSharingResult, EngineWarning, OutgoingAllocation, Period, Project,
    ProjectId, WarningCode,
};
use crate::store::RosterStore;

/// Sums the outgoing percentages of `project_id` over `edges`.
///
/// Edges whose source is another project are ignored.
pub fn outgoing_allocation(
    project_id: &ProjectId,
    edges: &[CostSharingEdge],
) -> OutgoingAllocation {
    let own: Vec<&CostSharingEdge> = edges.iter().filter(|e| &e.source == project_id).collect();
    let total_percentage: Decimal = own.iter().map(|e| e.percentage.value()).sum();
    OutgoingAllocation {
        project_id: project_id.clone(),
        total_percentage,
        edge_count: own.len(),
        over_allocated: total_percentage > Decimal::ONE_HUNDRED,
    }
}

/// Resolves shared-out, shared-in and net cost for single projects.
pub struct SharingResolver<'a> {
    store: &'a dyn RosterStore,
    policy: OverAllocationPolicy,
}

impl<'a> SharingResolver<'a> {
    /// Creates a resolver reading edges and projects from `store`.
    pub fn new(store: &'a dyn RosterStore, policy: OverAllocationPolicy) -> Self {
        Self { store, policy }
    }

    /// Resolves one project's sharing for `period`.
    ///
    /// `source_cost` supplies the original cost of each project that shares
    /// into this one.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project or an edge counterpart does not exist
    /// - `Inconsistent` if a counterpart is inactive in `period`, the project
    ///   is over-allocated under [`OverAllocationPolicy::Reject`], or the net
    ///   cost comes out negative
    /// - any error returned by `source_cost`
    pub fn resolve<F>(
        &self,
        project_id: &ProjectId,
        period: Period,
        original_cost: Decimal,
        source_cost: F,
    ) -> EngineResult<CostSharingResult>
    where
        F: Fn(&ProjectId) -> EngineResult<Decimal>,
    {
        let project = self
            .store
            .project(project_id)
            .ok_or_else(|| EngineError::not_found("project", project_id))?;

        let outgoing: Vec<CostSharingEdge> = self
            .store
            .sharing_from(project_id)
            .into_iter()
            .filter(|e| e.applies_to(period))
            .collect();
        let incoming: Vec<CostSharingEdge> = self
            .store
            .sharing_to(project_id)
            .into_iter()
            .filter(|e| e.applies_to(period))
            .collect();

        for edge in &outgoing {
            self.require_active_counterpart(&edge.destination, period)?;
        }
        for edge in &incoming {
            self.require_active_counterpart(&edge.source, period)?;
        }

        let mut warnings = Vec::new();

        let allocation = outgoing_allocation(project_id, &outgoing);
        if allocation.over_allocated {
            let message = format!(
                "project {} shares out {}% of its cost in {}",
                project_id, allocation.total_percentage, period
            );
            match self.policy {
                OverAllocationPolicy::Warn => warnings.push(EngineWarning {
                    code: WarningCode::OverAllocated,
                    message,
                }),
                OverAllocationPolicy::Reject => return Err(EngineError::inconsistent(message)),
            }
        }

        for edge in &outgoing {
            let reverse_applies = self
                .store
                .sharing_edge(&edge.destination, project_id)
                .is_some_and(|reverse| reverse.applies_to(period));
            if reverse_applies {
                warnings.push(EngineWarning {
                    code: WarningCode::ReciprocalSharing,
                    message: format!(
                        "projects {} and {} share cost with each other",
                        project_id, edge.destination
                    ),
                });
            }
        }

        let shared_out: Decimal = outgoing
            .iter()
            .map(|e| e.percentage.share_of(original_cost))
            .sum();

        let mut shared_in = Decimal::ZERO;
        for edge in &incoming {
            shared_in += edge.percentage.share_of(source_cost(&edge.source)?);
        }

        let net_cost = original_cost - shared_out + shared_in;
        if net_cost < Decimal::ZERO {
            return Err(EngineError::inconsistent(format!(
                "project {} resolves to a negative net cost of {} in {}",
                project_id, net_cost, period
            )));
        }

        Ok(CostSharingResult {
            project_id: project.id,
            project_name: project.name,
            original_cost,
            shared_out,
            shared_in,
            net_cost,
            warnings,
        })
    }

    fn require_active_counterpart(&self, id: &ProjectId, period: Period) -> EngineResult<Project> {
        let project = self
            .store
            .project(id)
            .ok_or_else(|| EngineError::not_found("project", id))?;
        if !project.is_active_in(period) {
            return Err(EngineError::inconsistent(format!(
                "sharing counterpart {} is inactive in {}",
                id, period
            )));
        }
        Ok(project)
    }
}
